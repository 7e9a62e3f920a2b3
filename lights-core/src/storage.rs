//! Persistierte Datensätze und typisierter Zugriff auf einen `ConfigStore`
//!
//! Jeder Datensatz ist ein JSON-Dokument unter einem festen Schlüssel.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::traits::{ConfigStore, StoreError};
use crate::types::{
    DEFAULT_BLINK_PERIOD_MS, DEFAULT_DAY_BLINK, DEFAULT_DAY_LAMPS, DEFAULT_NIGHT_BLINK,
    DEFAULT_NIGHT_LAMPS, LampSet, LightConfiguration, LightProfile, is_valid_blink_period,
};

/// Schlüssel der Lichtkonfiguration
pub const LIGHT_CONFIG_KEY: &str = "light_config";
/// Schlüssel des Kilometerzählers
pub const ODOMETER_KEY: &str = "odometer";

/// Maximale Größe eines serialisierten Datensatzes in Bytes
pub const RECORD_BUFFER_SIZE: usize = 256;
/// Maximale Länge eines Schlüssels
pub const MAX_KEY_LEN: usize = 24;

// ============================================================================
// Datensätze
// ============================================================================

/// Datensatz der Lichtkonfiguration
///
/// Alle Felder sind optional: fehlende oder ungültige Felder werden beim
/// Laden einzeln durch Defaults ersetzt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LightConfigRecord {
    #[serde(rename = "dayConfig", default, skip_serializing_if = "Option::is_none")]
    pub day_config: Option<u8>,
    #[serde(rename = "nightConfig", default, skip_serializing_if = "Option::is_none")]
    pub night_config: Option<u8>,
    #[serde(rename = "dayBlink", default, skip_serializing_if = "Option::is_none")]
    pub day_blink: Option<bool>,
    #[serde(rename = "nightBlink", default, skip_serializing_if = "Option::is_none")]
    pub night_blink: Option<bool>,
    #[serde(rename = "blinkFrequency", default, skip_serializing_if = "Option::is_none")]
    pub blink_frequency: Option<u16>,
}

impl LightConfigRecord {
    /// Wandelt den Datensatz in eine gültige Konfiguration (Defaults pro Feld)
    pub fn to_configuration(&self) -> LightConfiguration {
        let day_lamps = self
            .day_config
            .and_then(LampSet::from_bits)
            .unwrap_or(DEFAULT_DAY_LAMPS);
        let night_lamps = self
            .night_config
            .and_then(LampSet::from_bits)
            .unwrap_or(DEFAULT_NIGHT_LAMPS);
        let blink_period_ms = self
            .blink_frequency
            .filter(|period| is_valid_blink_period(*period))
            .unwrap_or(DEFAULT_BLINK_PERIOD_MS);

        LightConfiguration {
            day: LightProfile::new(day_lamps, self.day_blink.unwrap_or(DEFAULT_DAY_BLINK)),
            night: LightProfile::new(
                night_lamps,
                self.night_blink.unwrap_or(DEFAULT_NIGHT_BLINK),
            ),
            blink_period_ms,
        }
    }
}

impl From<&LightConfiguration> for LightConfigRecord {
    fn from(config: &LightConfiguration) -> Self {
        Self {
            day_config: Some(config.day.lamps.bits()),
            night_config: Some(config.night.lamps.bits()),
            day_blink: Some(config.day.blink),
            night_blink: Some(config.night.blink),
            blink_frequency: Some(config.blink_period_ms),
        }
    }
}

/// Datensatz des Kilometerzählers
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OdometerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f32>,
}

impl OdometerRecord {
    /// Gespeicherter Stand, `None` wenn fehlend, negativ oder nicht endlich
    pub fn valid_total(&self) -> Option<f32> {
        self.total.filter(|total| total.is_finite() && *total >= 0.0)
    }
}

// ============================================================================
// Typisierter Zugriff
// ============================================================================

/// Lädt und deserialisiert den Datensatz `key`
///
/// Nicht dekodierbare Daten werden zu `StoreError::CorruptRecord`.
pub fn load_record<S, T>(store: &mut S, key: &str) -> Result<T, StoreError>
where
    S: ConfigStore + ?Sized,
    T: DeserializeOwned,
{
    let mut buffer = [0u8; RECORD_BUFFER_SIZE];
    let len = store.read(key, &mut buffer)?;
    let data = buffer.get(..len).ok_or(StoreError::CorruptRecord)?;

    serde_json_core::from_slice::<T>(data)
        .map(|(record, _)| record)
        .map_err(|_| StoreError::CorruptRecord)
}

/// Serialisiert `record` und ersetzt den Datensatz `key`
pub fn save_record<S, T>(store: &mut S, key: &str, record: &T) -> Result<(), StoreError>
where
    S: ConfigStore + ?Sized,
    T: Serialize,
{
    let mut buffer = [0u8; RECORD_BUFFER_SIZE];
    let len =
        serde_json_core::to_slice(record, &mut buffer).map_err(|_| StoreError::PartialWrite)?;
    if len == 0 {
        return Err(StoreError::PartialWrite);
    }

    store.write(key, &buffer[..len])
}

// ============================================================================
// RAM-Speicher
// ============================================================================

struct Entry {
    key: String<MAX_KEY_LEN>,
    data: Vec<u8, RECORD_BUFFER_SIZE>,
}

/// Flüchtiger `ConfigStore` für bis zu `N` Schlüssel
///
/// Für Tests und als Rückfallebene ohne Flash.
pub struct MemoryStore<const N: usize> {
    entries: Vec<Entry, N>,
}

impl<const N: usize> MemoryStore<N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Anzahl gespeicherter Schlüssel
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rohdaten eines Schlüssels (für Diagnose und Tests)
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.key.as_str() == key)
            .map(|entry| entry.data.as_slice())
    }

    /// Entfernt einen Schlüssel, gibt `true` zurück wenn er existierte
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.iter().position(|entry| entry.key.as_str() == key) {
            Some(index) => {
                self.entries.swap_remove(index);
                true
            }
            None => false,
        }
    }
}

impl<const N: usize> Default for MemoryStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ConfigStore for MemoryStore<N> {
    fn read(&mut self, key: &str, buf: &mut [u8]) -> Result<usize, StoreError> {
        let data = self.get(key).ok_or(StoreError::Missing)?;
        let target = buf.get_mut(..data.len()).ok_or(StoreError::CorruptRecord)?;
        target.copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let data = Vec::from_slice(data).map_err(|_| StoreError::PartialWrite)?;

        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key.as_str() == key) {
            entry.data = data;
            return Ok(());
        }

        let key = String::try_from(key).map_err(|_| StoreError::StorageUnavailable)?;
        self.entries
            .push(Entry { key, data })
            .map_err(|_| StoreError::StorageUnavailable)
    }
}
