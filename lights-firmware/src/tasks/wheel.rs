// Rad-Task - Zählt Umdrehungen und meldet Strecke an den Steuer-Task
use defmt::{debug, info};
use embassy_time::{Duration, Instant};
use esp_hal::gpio::{Input, InputConfig, Pull};
use esp_hal::peripherals::GPIO7;

use crate::DistanceSender;
use crate::config::{ODOMETER_STEP_M, WHEEL_CIRCUMFERENCE_MM, WHEEL_GPIO_PIN, WHEEL_MIN_PULSE_MS};

/// Strecke pro Meldung in Millimetern
const STEP_MM: u32 = ODOMETER_STEP_M * 1000;

/// Rad-Task - Embassy Task für parallele Ausführung
///
/// Ein Impuls (fallende Flanke) pro Radumdrehung. Alle `ODOMETER_STEP_M`
/// Meter wird die Strecke in km gesendet, der Rest bleibt im Zähler.
///
/// # Parameter
/// - `gpio7`: GPIO7 Peripheral (Reed-/Hall-Sensor)
/// - `distance_sender`: Channel Sender zum Steuer-Task
#[embassy_executor::task]
pub async fn wheel_task(gpio7: GPIO7<'static>, distance_sender: DistanceSender) {
    let mut sensor = Input::new(gpio7, InputConfig::default().with_pull(Pull::Up));
    info!(
        "Wheel sensor: GPIO{}, {} mm per turn",
        WHEEL_GPIO_PIN, WHEEL_CIRCUMFERENCE_MM
    );

    let mut travelled_mm: u32 = 0;
    let mut last_pulse: Option<Instant> = None;

    loop {
        sensor.wait_for_falling_edge().await;

        let now = Instant::now();
        let bounced = match last_pulse {
            Some(last) => now.duration_since(last) < Duration::from_millis(WHEEL_MIN_PULSE_MS),
            None => false,
        };
        if bounced {
            debug!("Wheel: pulse ignored");
            continue;
        }
        last_pulse = Some(now);

        travelled_mm += WHEEL_CIRCUMFERENCE_MM;
        if travelled_mm >= STEP_MM {
            travelled_mm -= STEP_MM;
            distance_sender.send(ODOMETER_STEP_M as f32 / 1000.0).await;
        }
    }
}
