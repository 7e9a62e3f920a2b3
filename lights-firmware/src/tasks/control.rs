// Steuer-Task - Lichtsteuerung und Kilometerzähler im Polling-Takt
use defmt::{info, warn};
use embassy_time::{Duration, Instant, Ticker};
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::peripherals::{GPIO4, GPIO5, GPIO6};
use lights_core::{ConfigStore, LampDriver};

use crate::config::{DRL_GPIO_PIN, FRONT_GPIO_PIN, POLL_INTERVAL_MS, REAR_GPIO_PIN};
use crate::{
    DistanceReceiver, LightCommandReceiver, LightController, OdometerCounter, OutputPins,
    SharedRecordStore,
};

/// Steuer-Logik - Testbare Business Logic ohne Hardware-Abhängigkeit
///
/// Pro Takt:
/// - alle wartenden Kommandos ausführen
/// - gemeldete Strecke auf den Kilometerzähler addieren (wartet auf einen
///   gelesenen Stand, solange der Flash nicht erreichbar ist)
/// - `update()` mit der aktuellen Zeit aufrufen (Blink-Takt)
///
/// # Trait-basierte Abstraktion
/// - `D: LampDriver` - GPIO-Ausgänge oder Mock
/// - `S`, `O: ConfigStore` - Flash oder Mock, dürfen denselben Speicher teilen
pub async fn control_logic<D, S, O>(
    mut lights: LightController<D, S>,
    mut odometer: OdometerCounter<O>,
    command_receiver: LightCommandReceiver,
    distance_receiver: DistanceReceiver,
) -> !
where
    D: LampDriver,
    S: ConfigStore,
    O: ConfigStore,
{
    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));

    loop {
        // Kommandos von Taster (non-blocking, alle wartenden)
        while let Ok(command) = command_receiver.try_receive() {
            info!("Command received: {}", command);
            if lights.apply(command).is_err() {
                warn!("Command rejected: {}", command);
            }
        }

        // Strecke seit dem letzten Takt
        let mut distance_km = 0.0;
        while let Ok(km) = distance_receiver.try_receive() {
            distance_km += km;
        }
        if distance_km > 0.0 {
            odometer.add_distance(distance_km);
            info!(
                "Odometer: {} km ({} km pending)",
                odometer.raw_total(),
                odometer.pending_km()
            );
        }

        // u32-Millisekunden laufen nach ~49 Tagen über, update() rechnet mit wrapping_sub
        lights.update(Instant::now().as_millis() as u32);

        ticker.next().await;
    }
}

/// Steuer-Task - Embassy Task für parallele Ausführung
///
/// Initialisiert die drei Lampen-Ausgänge (alle LOW) und ruft dann die
/// testbare `control_logic()` auf.
///
/// # Parameter
/// - `gpio4`, `gpio5`, `gpio6`: Front, DRL, Rear
/// - `store`: Flash-Speicher, geteilt von Lichtsteuerung und Kilometerzähler
/// - `command_receiver`: Kommandos vom Taster-Task
/// - `distance_receiver`: Strecke vom Rad-Task
#[embassy_executor::task]
pub async fn control_task(
    gpio4: GPIO4<'static>,
    gpio5: GPIO5<'static>,
    gpio6: GPIO6<'static>,
    store: &'static SharedRecordStore,
    command_receiver: LightCommandReceiver,
    distance_receiver: DistanceReceiver,
) {
    let front = Output::new(gpio4, Level::Low, OutputConfig::default());
    let drl = Output::new(gpio5, Level::Low, OutputConfig::default());
    let rear = Output::new(gpio6, Level::Low, OutputConfig::default());
    info!(
        "Lamps: front=GPIO{} drl=GPIO{} rear=GPIO{}",
        FRONT_GPIO_PIN, DRL_GPIO_PIN, REAR_GPIO_PIN
    );

    let lights = LightController::new(OutputPins::new(front, drl, rear), store);
    let odometer = OdometerCounter::new(store);
    if !odometer.is_valid() {
        warn!("Odometer storage unavailable, distance is held back until it can be read");
    }

    control_logic(lights, odometer, command_receiver, distance_receiver).await;
}
