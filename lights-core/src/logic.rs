//! Pure Business Logic Functions
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)

use crate::types::{Lamp, LightConfiguration, LightMode};

/// Soll-Zustand der drei Ausgänge für einen Modus
///
/// `blink` gibt an, ob das Rücklicht vom Blink-Takt gesteuert wird.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LampOutputs {
    pub front: bool,
    pub drl: bool,
    pub rear: bool,
    pub blink: bool,
}

impl LampOutputs {
    /// Alle Lampen an, kein Blinken (Konfigurationsmodus)
    pub const ALL_ON: Self = Self {
        front: true,
        drl: true,
        rear: true,
        blink: false,
    };

    pub const fn level(&self, lamp: Lamp) -> bool {
        match lamp {
            Lamp::Front => self.front,
            Lamp::Drl => self.drl,
            Lamp::Rear => self.rear,
        }
    }
}

/// Berechnet die Ausgänge aus Modus und Konfiguration
///
/// # Beispiele
///
/// ```
/// # use lights_core::{LightConfiguration, LightMode, compute_outputs};
/// let outputs = compute_outputs(LightMode::Night, &LightConfiguration::default());
/// assert!(outputs.front && outputs.rear && !outputs.drl);
/// assert!(!outputs.blink);
/// ```
pub fn compute_outputs(mode: LightMode, config: &LightConfiguration) -> LampOutputs {
    match config.profile(mode) {
        None => LampOutputs::default(),
        Some(profile) => LampOutputs {
            front: profile.lamps.front(),
            drl: profile.lamps.drl(),
            rear: profile.lamps.rear(),
            blink: profile.blinks_rear(),
        },
    }
}

/// Prüft ob seit `last_ms` mindestens `period_ms` vergangen sind
///
/// Rechnet mit `wrapping_sub`, damit der Überlauf der 32-Bit-Millisekunden
/// (nach ~49 Tagen) den Blinker weder einfriert noch rasen lässt.
pub const fn blink_due(now_ms: u32, last_ms: u32, period_ms: u16) -> bool {
    now_ms.wrapping_sub(last_ms) >= period_ms as u32
}
