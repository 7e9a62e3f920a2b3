// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
#![allow(dead_code)]

// ============================================================================
// Lampen-Ausgänge
// ============================================================================

/// GPIO-Pin für das Frontlicht
pub const FRONT_GPIO_PIN: u8 = 4;

/// GPIO-Pin für das Tagfahrlicht (DRL)
pub const DRL_GPIO_PIN: u8 = 5;

/// GPIO-Pin für das Rücklicht
pub const REAR_GPIO_PIN: u8 = 6;

/// Polling-Intervall des Steuer-Tasks in Millisekunden
/// Muss ≤ 50 ms sein, sonst wird der Blink-Takt ungenau
pub const POLL_INTERVAL_MS: u64 = 20;

/// Kapazität des Kommando-Channels (Taster → Steuer-Task)
pub const COMMAND_CHANNEL_SIZE: usize = 4;

// ============================================================================
// Taster
// ============================================================================

/// GPIO-Pin für den Modus-Taster (BOOT-Taster auf dem DevKit, aktiv LOW)
pub const BUTTON_GPIO_PIN: u8 = 9;

/// Entprell-Zeit in Millisekunden
pub const BUTTON_DEBOUNCE_MS: u64 = 30;

/// Ab dieser Haltezeit zählt ein Druck als langer Druck (Konfigurationsmodus)
pub const LONG_PRESS_MS: u64 = 1500;

// ============================================================================
// Kilometerzähler
// ============================================================================

/// GPIO-Pin für den Rad-Sensor (Reed/Hall, aktiv LOW)
pub const WHEEL_GPIO_PIN: u8 = 7;

/// Radumfang in Millimetern (28" Reifen)
pub const WHEEL_CIRCUMFERENCE_MM: u32 = 2_200;

/// Nach so vielen Metern wird eine Strecke an den Steuer-Task gemeldet
/// Jede Meldung schreibt einmal in den Flash
pub const ODOMETER_STEP_M: u32 = 100;

/// Impulse, die schneller als dieser Abstand kommen, sind Prellen
pub const WHEEL_MIN_PULSE_MS: u64 = 40;

/// Kapazität des Strecken-Channels (Rad-Task → Steuer-Task)
pub const DISTANCE_CHANNEL_SIZE: usize = 4;

// ============================================================================
// Flash
// ============================================================================

/// Start der Datensatz-Region im Flash (Partition `lights` in partitions.csv)
/// Zwei 4-KB-Bänke (A/B) pro Schlüssel, 16 KB insgesamt
pub const RECORD_FLASH_OFFSET: u32 = 0x3F_0000;
