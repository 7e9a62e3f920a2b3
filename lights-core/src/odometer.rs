//! Kilometerzähler mit Persistenz
//!
//! Der Stand steigt nur. Späte, doppelte oder vertauschte Messwerte vom
//! Sensor sind normal und werden still ignoriert.

use crate::storage::{ODOMETER_KEY, OdometerRecord, load_record, save_record};
use crate::traits::{ConfigStore, StoreError};
use crate::types::InvalidValue;

/// Monotoner Kilometerzähler
pub struct OdometerCounter<S: ConfigStore> {
    store: S,
    total: f32,
    valid: bool,
    /// Gespeicherter Stand ist bekannt (gelesen, fehlend oder beschädigt)
    loaded: bool,
    pending_km: f32,
}

impl<S: ConfigStore> OdometerCounter<S> {
    /// Erstellt den Zähler und lädt den gespeicherten Stand
    pub fn new(store: S) -> Self {
        let mut counter = Self {
            store,
            total: 0.0,
            valid: false,
            loaded: false,
            pending_km: 0.0,
        };
        counter.reload();
        counter
    }

    /// Lädt den Stand neu, gibt [`is_valid`](Self::is_valid) zurück
    ///
    /// Fehlt der Datensatz oder ist er beschädigt, startet der Zähler bei 0
    /// und versucht, einen sauberen Datensatz zu schreiben.
    pub fn reload(&mut self) -> bool {
        let result = load_record::<_, OdometerRecord>(&mut self.store, ODOMETER_KEY)
            .and_then(|record| record.valid_total().ok_or(StoreError::CorruptRecord));

        match result {
            Ok(total) => {
                self.total = total;
                self.valid = true;
                self.loaded = true;
                info!("Odometer: loaded {}", total);
            }
            Err(StoreError::Missing) | Err(StoreError::CorruptRecord) => {
                warn!("Odometer: no usable record, starting at 0");
                self.total = 0.0;
                self.loaded = true;
                // Ergebnis steckt in `valid`
                let _ = self.save();
            }
            Err(e) => {
                error!("Odometer: storage failed: {}", e);
                self.total = 0.0;
                self.valid = false;
                self.loaded = false;
            }
        }

        self.valid
    }

    /// Aktueller Stand im Speicher (0 wenn nie geladen)
    pub fn raw_total(&self) -> f32 {
        self.total
    }

    /// `true` sobald einmal erfolgreich geladen oder gespeichert wurde
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Strecke, die noch auf einen gültigen Stand wartet
    pub fn pending_km(&self) -> f32 {
        self.pending_km
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn release(self) -> S {
        self.store
    }

    /// Kalibrierung: setzt den Stand ohne Monotonie-Prüfung
    ///
    /// Negative oder nicht endliche Werte werden abgelehnt.
    pub fn set_initial_value(&mut self, value: f32) -> Result<(), InvalidValue> {
        if !value.is_finite() || value < 0.0 {
            error!("Odometer: rejected initial value {}", value);
            return Err(InvalidValue);
        }

        info!("Odometer: initial value {}", value);
        self.total = value;
        self.persist();
        Ok(())
    }

    /// Übernimmt einen neuen Messwert, wenn er größer als der Stand ist
    pub fn update_total(&mut self, value: f32) {
        if !value.is_finite() || value <= self.total {
            debug!("Odometer: ignored {} (total {})", value, self.total);
            return;
        }

        debug!("Odometer: {} -> {}", self.total, value);
        self.total = value;
        self.persist();
    }

    /// Addiert eine gefahrene Strecke auf den Stand
    ///
    /// Solange der gespeicherte Stand nicht gelesen werden konnte, wird die
    /// Strecke gesammelt und bei jedem Aufruf neu geladen. Aufaddiert und
    /// gespeichert wird erst auf den geladenen Stand.
    pub fn add_distance(&mut self, km: f32) {
        if !km.is_finite() || km <= 0.0 {
            debug!("Odometer: ignored distance {}", km);
            return;
        }

        self.pending_km += km;
        if !self.loaded {
            self.reload();
        }
        if !self.loaded {
            warn!("Odometer: storage unavailable, {} km pending", self.pending_km);
            return;
        }

        let distance = core::mem::take(&mut self.pending_km);
        self.update_total(self.total + distance);
    }

    /// Setzt den Zähler auf 0 zurück (Wartung)
    pub fn reset(&mut self) -> Result<(), StoreError> {
        info!("Odometer: reset");
        self.total = 0.0;
        self.save()
    }

    /// Speichert den aktuellen Stand
    pub fn save(&mut self) -> Result<(), StoreError> {
        let record = OdometerRecord {
            total: Some(self.total),
        };
        save_record(&mut self.store, ODOMETER_KEY, &record)?;
        self.valid = true;
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            error!("Odometer: saving {} failed: {}", self.total, e);
        }
    }
}
