//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Lampen-Ausgänge und
//! nichtflüchtigen Speicher ohne konkrete Implementierung.

use core::cell::RefCell;
use core::fmt;

use crate::types::Lamp;

/// Fehler-Typ für Lampen-Ausgänge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LampError {
    WriteFailed,
}

/// Trait für die drei Lampen-Ausgänge (Front, Tagfahrlicht, Rücklicht)
///
/// # Implementierungen
/// - **Production:** [`OutputPins`](crate::pins::OutputPins) über embedded-hal `OutputPin`
/// - **Testing:** MockLampDriver (in-memory Mock)
pub trait LampDriver {
    /// Setzt den Pegel eines Ausgangs (`true` = HIGH)
    ///
    /// # Fehlerbehandlung
    /// Gibt `LampError::WriteFailed` zurück wenn der Hardware-Zugriff fehlschlägt
    fn set_lamp(&mut self, lamp: Lamp, on: bool) -> Result<(), LampError>;
}

/// Fehler-Typ für Speicher-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Speicher nicht gemountet / nicht erreichbar
    StorageUnavailable,
    /// Kein Datensatz unter diesem Schlüssel
    Missing,
    /// Datensatz vorhanden, aber nicht lesbar
    CorruptRecord,
    /// Serialisierung lieferte keine (vollständigen) Bytes
    PartialWrite,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            StoreError::StorageUnavailable => "storage unavailable",
            StoreError::Missing => "record missing",
            StoreError::CorruptRecord => "record corrupt",
            StoreError::PartialWrite => "record could not be serialized",
        };
        f.write_str(msg)
    }
}

/// Trait für nichtflüchtigen Schlüssel/Datensatz-Speicher
///
/// Vertrag für Implementierungen:
/// - `read` liefert für fehlende oder beschädigte Schlüssel einen Fehler,
///   niemals einen halb geschriebenen Datensatz
/// - `write` ersetzt den alten Datensatz vollständig oder schlägt fehl
/// - `write` mit identischem Inhalt ist gleichwertig zu keinem Schreibvorgang
///
/// # Implementierungen
/// - [`MemoryStore`](crate::storage::MemoryStore) (RAM)
/// - [`NorFlashStore`](crate::nor_flash::NorFlashStore) (SPI-Flash)
/// - `FileStore` (Dateisystem, Feature `std`)
pub trait ConfigStore {
    /// Liest den Datensatz `key` nach `buf`, gibt die Länge zurück
    fn read(&mut self, key: &str, buf: &mut [u8]) -> Result<usize, StoreError>;

    /// Ersetzt den Datensatz `key` durch `data`
    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError>;
}

impl<S: ConfigStore + ?Sized> ConfigStore for &mut S {
    fn read(&mut self, key: &str, buf: &mut [u8]) -> Result<usize, StoreError> {
        (**self).read(key, buf)
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        (**self).write(key, data)
    }
}

/// Geteilter Speicher für mehrere Manager in einer Single-Thread-Schleife
///
/// Ist der Speicher bereits ausgeliehen, gilt er als nicht verfügbar.
impl<S: ConfigStore> ConfigStore for &RefCell<S> {
    fn read(&mut self, key: &str, buf: &mut [u8]) -> Result<usize, StoreError> {
        self.try_borrow_mut()
            .map_err(|_| StoreError::StorageUnavailable)?
            .read(key, buf)
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        self.try_borrow_mut()
            .map_err(|_| StoreError::StorageUnavailable)?
            .write(key, data)
    }
}
