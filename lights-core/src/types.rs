//! Core Types für die Lichtsteuerung
//!
//! Datenstrukturen ohne Hardware-Dependencies

use core::fmt;
use core::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

// ============================================================================
// Defaults & Grenzwerte
// ============================================================================

/// Lampen im Tagmodus, wenn nichts (Gültiges) gespeichert ist
pub const DEFAULT_DAY_LAMPS: LampSet = LampSet::REAR;
/// Rücklicht blinkt im Tagmodus
pub const DEFAULT_DAY_BLINK: bool = true;
/// Lampen im Nachtmodus, wenn nichts (Gültiges) gespeichert ist
pub const DEFAULT_NIGHT_LAMPS: LampSet = LampSet::FRONT.union(LampSet::REAR);
/// Rücklicht leuchtet im Nachtmodus dauerhaft
pub const DEFAULT_NIGHT_BLINK: bool = false;

/// Blink-Halbperiode in ms
pub const DEFAULT_BLINK_PERIOD_MS: u16 = 500;
pub const MIN_BLINK_PERIOD_MS: u16 = 100;
pub const MAX_BLINK_PERIOD_MS: u16 = 2000;

/// Prüft ob eine Blink-Periode im erlaubten Bereich liegt
pub const fn is_valid_blink_period(period_ms: u16) -> bool {
    period_ms >= MIN_BLINK_PERIOD_MS && period_ms <= MAX_BLINK_PERIOD_MS
}

/// Fehler für Eingaben außerhalb des gültigen Bereichs
///
/// Einziger Fehler, den Setter an den Aufrufer zurückgeben.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidValue;

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("value out of range")
    }
}

// ============================================================================
// Lampen
// ============================================================================

/// Eine physische Lampe (ein Ausgang)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lamp {
    Front,
    Drl,
    Rear,
}

impl Lamp {
    /// Alle Lampen in Flag-Bit-Reihenfolge
    pub const ALL: [Lamp; 3] = [Lamp::Front, Lamp::Drl, Lamp::Rear];

    pub const fn flag(self) -> LampSet {
        match self {
            Lamp::Front => LampSet::FRONT,
            Lamp::Drl => LampSet::DRL,
            Lamp::Rear => LampSet::REAR,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Lamp::Front => "FRONT",
            Lamp::Drl => "DRL",
            Lamp::Rear => "REAR",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Lamp::Front => 0,
            Lamp::Drl => 1,
            Lamp::Rear => 2,
        }
    }
}

/// Menge eingeschalteter Lampen (Bitmaske über FRONT/DRL/REAR)
///
/// Nur die unteren drei Bits sind belegt. Werte außerhalb `0..=7`
/// lassen sich nicht konstruieren und gelangen so nie in die Persistenz.
///
/// # Beispiele
///
/// ```
/// # use lights_core::LampSet;
/// let lamps = LampSet::FRONT | LampSet::REAR;
/// assert!(lamps.rear());
/// assert_eq!(lamps.bits(), 0b101);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LampSet(u8);

impl LampSet {
    pub const NONE: Self = Self(0);
    pub const FRONT: Self = Self(1 << 0);
    pub const DRL: Self = Self(1 << 1);
    pub const REAR: Self = Self(1 << 2);
    pub const ALL: Self = Self(0b111);

    /// Bitmaske → LampSet, `None` für Werte > 7
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL.0 == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// Bitmaske → LampSet, unbekannte Bits werden verworfen
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn has(self, lamp: Lamp) -> bool {
        self.contains(lamp.flag())
    }

    pub const fn front(self) -> bool {
        self.has(Lamp::Front)
    }

    pub const fn drl(self) -> bool {
        self.has(Lamp::Drl)
    }

    pub const fn rear(self) -> bool {
        self.has(Lamp::Rear)
    }

    /// Parst die Textdarstellung (`"FRONT+REAR"`, `"NONE"`, ...)
    ///
    /// Jeder bekannte Token, der irgendwo im Text vorkommt, setzt sein Flag
    /// (case-sensitive, Reihenfolge egal). Unbekannte Tokens werden ignoriert,
    /// der Parser schlägt nie fehl.
    ///
    /// ```
    /// # use lights_core::LampSet;
    /// assert_eq!(LampSet::parse("REAR+FRONT"), LampSet::FRONT | LampSet::REAR);
    /// assert_eq!(LampSet::parse("NONE"), LampSet::NONE);
    /// assert_eq!(LampSet::parse("FOG"), LampSet::NONE);
    /// ```
    pub fn parse(text: &str) -> Self {
        if text.contains("ALL") {
            return Self::ALL;
        }

        Lamp::ALL
            .iter()
            .filter(|lamp| text.contains(lamp.as_str()))
            .fold(Self::NONE, |set, lamp| set | lamp.flag())
    }
}

impl TryFrom<u8> for LampSet {
    type Error = InvalidValue;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::from_bits(bits).ok_or(InvalidValue)
    }
}

impl BitOr for LampSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for LampSet {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for LampSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Textdarstellung: Tokens in Flag-Bit-Reihenfolge mit `+`, leer = `NONE`
impl fmt::Display for LampSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }

        let mut first = true;
        for lamp in Lamp::ALL.iter().filter(|lamp| self.has(**lamp)) {
            if !first {
                f.write_str("+")?;
            }
            f.write_str(lamp.as_str())?;
            first = false;
        }
        Ok(())
    }
}

// ============================================================================
// Modi
// ============================================================================

/// Betriebsmodus der Beleuchtung
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightMode {
    #[default]
    Off,
    Day,
    Night,
}

impl LightMode {
    /// Nächster Modus im Zyklus: OFF → DAY → NIGHT → OFF
    pub const fn next(self) -> Self {
        match self {
            LightMode::Off => LightMode::Day,
            LightMode::Day => LightMode::Night,
            LightMode::Night => LightMode::Off,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LightMode::Off => "OFF",
            LightMode::Day => "DAY",
            LightMode::Night => "NIGHT",
        }
    }
}

impl TryFrom<u8> for LightMode {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LightMode::Off),
            1 => Ok(LightMode::Day),
            2 => Ok(LightMode::Night),
            _ => Err(InvalidValue),
        }
    }
}

impl fmt::Display for LightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wer die Lampen ansteuert
///
/// Rein informativ: `Controller` bedeutet, dass der Motor-Controller die
/// Lampen schaltet. Die Ausgänge dieser Steuerung ändern sich dadurch nicht.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlSource {
    #[default]
    Smart,
    Controller,
}

impl ControlSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            ControlSource::Smart => "Smart",
            ControlSource::Controller => "Controller",
        }
    }
}

impl TryFrom<&str> for ControlSource {
    type Error = InvalidValue;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        match name {
            "Smart" => Ok(ControlSource::Smart),
            "Controller" => Ok(ControlSource::Controller),
            _ => Err(InvalidValue),
        }
    }
}

// ============================================================================
// Konfiguration
// ============================================================================

/// Lampen + Blink-Flag für einen Modus (Tag oder Nacht)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LightProfile {
    pub lamps: LampSet,
    pub blink: bool,
}

impl LightProfile {
    pub const fn new(lamps: LampSet, blink: bool) -> Self {
        Self { lamps, blink }
    }

    /// Rücklicht blinkt nur, wenn es auch eingeschaltet ist
    pub const fn blinks_rear(&self) -> bool {
        self.blink && self.lamps.rear()
    }
}

/// Persistierte Lichtkonfiguration
///
/// Invariante: `blink_period_ms` liegt in `[MIN_BLINK_PERIOD_MS, MAX_BLINK_PERIOD_MS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LightConfiguration {
    pub day: LightProfile,
    pub night: LightProfile,
    pub blink_period_ms: u16,
}

impl LightConfiguration {
    /// Profil für einen Modus, `None` für OFF
    pub const fn profile(&self, mode: LightMode) -> Option<&LightProfile> {
        match mode {
            LightMode::Off => None,
            LightMode::Day => Some(&self.day),
            LightMode::Night => Some(&self.night),
        }
    }
}

impl Default for LightConfiguration {
    fn default() -> Self {
        Self {
            day: LightProfile::new(DEFAULT_DAY_LAMPS, DEFAULT_DAY_BLINK),
            night: LightProfile::new(DEFAULT_NIGHT_LAMPS, DEFAULT_NIGHT_BLINK),
            blink_period_ms: DEFAULT_BLINK_PERIOD_MS,
        }
    }
}

// ============================================================================
// Laufzeit-Zustand
// ============================================================================

/// Abgeleiteter Zustand, wird nicht persistiert
///
/// `front_on`/`drl_on`/`rear_on` sind die zuletzt geschriebenen Pegel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RuntimeLightState {
    pub mode: LightMode,
    pub front_on: bool,
    pub drl_on: bool,
    pub rear_on: bool,
    pub blink_phase: bool,
    pub last_phase_flip_ms: Option<u32>,
    pub config_override_active: bool,
}

/// Status-Snapshot für Anzeigen (Display, App, Log)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LightStatus {
    pub mode: LightMode,
    pub front: bool,
    pub drl: bool,
    pub rear: bool,
    pub blinking: bool,
    pub config_mode: bool,
    pub control: ControlSource,
}

// ============================================================================
// Kommandos
// ============================================================================

/// Kommando an die Lichtsteuerung
///
/// Wird von Taster- oder Bedien-Tasks an den Steuer-Task gesendet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightCommand {
    SetMode(LightMode),
    CycleMode,
    SetDayProfile(LightProfile),
    SetNightProfile(LightProfile),
    SetBlinkPeriod(u16),
    EnterConfigMode,
    ExitConfigMode,
    ToggleConfigMode,
    SetControlSource(ControlSource),
}

impl TryFrom<&str> for LightCommand {
    type Error = InvalidValue;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        match name {
            "off" => Ok(Self::SetMode(LightMode::Off)),
            "day" => Ok(Self::SetMode(LightMode::Day)),
            "night" => Ok(Self::SetMode(LightMode::Night)),
            "cycle" => Ok(Self::CycleMode),
            "config-on" => Ok(Self::EnterConfigMode),
            "config-off" => Ok(Self::ExitConfigMode),
            "config" => Ok(Self::ToggleConfigMode),
            _ => Err(InvalidValue),
        }
    }
}
