// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod tasks;

// Re-exports von lights-core
pub use lights_core::{
    LampSet, LightCommand, LightController, LightMode, NorFlashStore, OdometerCounter, OutputPins,
};

use core::cell::RefCell;

// Embassy Channel-Typen
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

// Hardware-Typen
use esp_hal::gpio::Output;
use esp_storage::FlashStorage;

use crate::config::{COMMAND_CHANNEL_SIZE, DISTANCE_CHANNEL_SIZE};

// ============================================================================
// Type-Aliase für Hardware und Speicher
// ============================================================================

/// Datensatz-Speicher im internen Flash
pub type RecordStore = NorFlashStore<FlashStorage<'static>>;

/// Gemeinsamer Speicher für Lichtsteuerung und Kilometerzähler
/// Beide laufen im selben Task, `RefCell` reicht
pub type SharedRecordStore = RefCell<RecordStore>;

/// Front, DRL, Rear als GPIO-Ausgänge
pub type LampPins = OutputPins<Output<'static>, Output<'static>, Output<'static>>;

/// Lichtsteuerung wie sie auf dem Board läuft
pub type BoardLights = LightController<LampPins, &'static SharedRecordStore>;

/// Kilometerzähler wie er auf dem Board läuft
pub type BoardOdometer = OdometerCounter<&'static SharedRecordStore>;

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Statt:  Sender<'static, NoopRawMutex, LightCommand, 4>
// Nutze:  LightCommandSender

/// Channel für Licht-Kommandos (Taster → Steuer-Task)
pub type LightCommandChannel = Channel<NoopRawMutex, LightCommand, COMMAND_CHANNEL_SIZE>;

/// Sender für Licht-Kommandos
pub type LightCommandSender = Sender<'static, NoopRawMutex, LightCommand, COMMAND_CHANNEL_SIZE>;

/// Receiver für Licht-Kommandos (Steuer-Task empfängt)
pub type LightCommandReceiver =
    Receiver<'static, NoopRawMutex, LightCommand, COMMAND_CHANNEL_SIZE>;

/// Channel für gefahrene Strecke in km (Rad-Task → Steuer-Task)
pub type DistanceChannel = Channel<NoopRawMutex, f32, DISTANCE_CHANNEL_SIZE>;

/// Sender für Strecken-Meldungen
pub type DistanceSender = Sender<'static, NoopRawMutex, f32, DISTANCE_CHANNEL_SIZE>;

/// Receiver für Strecken-Meldungen
pub type DistanceReceiver = Receiver<'static, NoopRawMutex, f32, DISTANCE_CHANNEL_SIZE>;
