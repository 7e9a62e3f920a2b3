// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

use core::cell::RefCell;

// Embassy Async Runtime
use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use esp_storage::FlashStorage;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use lights_firmware::config::RECORD_FLASH_OFFSET;
use lights_firmware::tasks::{button_task, control_task, wheel_task};
use lights_firmware::{DistanceChannel, LightCommandChannel, NorFlashStore, SharedRecordStore};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Initialisiert Hardware und Flash, startet Embassy Runtime und spawnt Tasks.
/// Danach schläft main() - alle Arbeit läuft in Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    defmt::info!("Lights firmware starting");

    // Datensatz-Speicher im internen Flash
    // Lichtsteuerung und Kilometerzähler teilen sich einen Speicher (selber Task)
    static RECORD_STORE: static_cell::StaticCell<SharedRecordStore> =
        static_cell::StaticCell::new();
    let store = &*RECORD_STORE.init(RefCell::new(NorFlashStore::new(
        FlashStorage::new(peripherals.FLASH),
        RECORD_FLASH_OFFSET,
    )));

    // Kommando-Channel erstellen (Taster → Steuer-Task)
    static COMMAND_CHANNEL: static_cell::StaticCell<LightCommandChannel> =
        static_cell::StaticCell::new();
    let command_channel = COMMAND_CHANNEL.init(LightCommandChannel::new());

    // Strecken-Channel erstellen (Rad-Task → Steuer-Task)
    static DISTANCE_CHANNEL: static_cell::StaticCell<DistanceChannel> =
        static_cell::StaticCell::new();
    let distance_channel = DISTANCE_CHANNEL.init(DistanceChannel::new());

    // Spawn Steuer-Task (besitzt Lampen-Ausgänge, Speicher und beide Receiver)
    spawner
        .spawn(control_task(
            peripherals.GPIO4,
            peripherals.GPIO5,
            peripherals.GPIO6,
            store,
            command_channel.receiver(),
            distance_channel.receiver(),
        ))
        .unwrap();

    // Spawn Eingabe-Tasks
    spawner
        .spawn(button_task(peripherals.GPIO9, command_channel.sender()))
        .unwrap();
    spawner
        .spawn(wheel_task(peripherals.GPIO7, distance_channel.sender()))
        .unwrap();

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
