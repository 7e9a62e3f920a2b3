// Taster-Task - Kurzer Druck schaltet den Modus, langer Druck den Konfigurationsmodus
use defmt::{debug, info};
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Timer};
use esp_hal::gpio::{Input, InputConfig, Pull};
use esp_hal::peripherals::GPIO9;

use crate::config::{BUTTON_DEBOUNCE_MS, BUTTON_GPIO_PIN, LONG_PRESS_MS};
use crate::{LightCommand, LightCommandSender};

/// Taster-Task - Embassy Task für parallele Ausführung
///
/// Der Taster ist aktiv LOW (interner Pull-Up). Ein langer Druck löst schon
/// beim Erreichen von `LONG_PRESS_MS` aus, nicht erst beim Loslassen.
///
/// # Parameter
/// - `gpio9`: GPIO9 Peripheral (BOOT-Taster)
/// - `command_sender`: Channel Sender zum Steuer-Task
#[embassy_executor::task]
pub async fn button_task(gpio9: GPIO9<'static>, command_sender: LightCommandSender) {
    let mut button = Input::new(gpio9, InputConfig::default().with_pull(Pull::Up));
    info!("Button: GPIO{}", BUTTON_GPIO_PIN);

    loop {
        button.wait_for_falling_edge().await;

        // Entprellen: nach der Wartezeit muss der Taster noch gedrückt sein
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        if button.is_high() {
            debug!("Button: bounce ignored");
            continue;
        }

        let hold = Timer::after(Duration::from_millis(LONG_PRESS_MS - BUTTON_DEBOUNCE_MS));
        let command = match select(button.wait_for_high(), hold).await {
            Either::First(()) => LightCommand::CycleMode,
            Either::Second(()) => {
                // Erst nach dem Loslassen wieder auf Drücke hören
                command_sender.send(LightCommand::ToggleConfigMode).await;
                button.wait_for_high().await;
                Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
                continue;
            }
        };

        command_sender.send(command).await;
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
    }
}
