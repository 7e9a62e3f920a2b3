//! Lights Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Lampen-Steuerung, Kilometerzähler, Speicher-Traits und
//! Datensätze. Pins und Flash kommen über `embedded-hal` bzw.
//! `embedded-storage` von außen.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod light;
pub mod logic;
pub mod nor_flash;
pub mod odometer;
pub mod pins;
pub mod protocol;
pub mod storage;
pub mod traits;
pub mod types;

#[cfg(feature = "std")]
pub mod fs_store;

// Re-exports für einfachen Zugriff
pub use light::LightController;
pub use logic::{LampOutputs, blink_due, compute_outputs};
pub use nor_flash::NorFlashStore;
pub use odometer::OdometerCounter;
pub use pins::OutputPins;
pub use protocol::LightSettings;
pub use storage::{
    LIGHT_CONFIG_KEY, LightConfigRecord, MemoryStore, ODOMETER_KEY, OdometerRecord, load_record,
    save_record,
};
pub use traits::{ConfigStore, LampDriver, LampError, StoreError};
pub use types::{
    ControlSource, DEFAULT_BLINK_PERIOD_MS, InvalidValue, Lamp, LampSet, LightCommand,
    LightConfiguration, LightMode, LightProfile, LightStatus, MAX_BLINK_PERIOD_MS,
    MIN_BLINK_PERIOD_MS, RuntimeLightState,
};

#[cfg(feature = "std")]
pub use fs_store::FileStore;
