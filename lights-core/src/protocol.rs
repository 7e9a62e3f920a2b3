//! Einstellungs-Dokument für Bedienoberflächen
//!
//! Lampen werden hier als Text übertragen (`"DRL+REAR"`), nicht als Bitmaske.

use core::fmt::Write;

use heapless::String;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{ControlSource, InvalidValue, LampSet, LightConfiguration, LightProfile};

/// Platz für den längsten Lampen-Text (`"FRONT+DRL+REAR"`)
pub const LAMP_NAME_LEN: usize = 16;

/// Textdarstellung einer Lampen-Menge
pub fn lamp_name(lamps: LampSet) -> String<LAMP_NAME_LEN> {
    let mut name = String::new();
    // Passt immer: höchstens 14 Zeichen
    let _ = write!(name, "{}", lamps);
    name
}

/// Liest einen Lampen-Text beliebiger Länge und legt ihn normalisiert ab
///
/// Unbekannte Teile fallen weg (`"FRONT+FOG"` wird zu `"FRONT"`).
fn lamp_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String<LAMP_NAME_LEN>, D::Error> {
    let text = <&'de str>::deserialize(deserializer)?;
    Ok(lamp_name(LampSet::parse(text)))
}

/// Einstellungen wie sie eine Bedienoberfläche sieht
///
/// ```json
/// {"dayLights":"REAR","nightLights":"FRONT+REAR","dayBlink":true,
///  "nightBlink":false,"blinkFrequency":500,"controlMode":"Smart"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightSettings {
    #[serde(deserialize_with = "lamp_text")]
    pub day_lights: String<LAMP_NAME_LEN>,
    #[serde(deserialize_with = "lamp_text")]
    pub night_lights: String<LAMP_NAME_LEN>,
    pub day_blink: bool,
    pub night_blink: bool,
    pub blink_frequency: u16,
    #[serde(default)]
    pub control_mode: ControlSource,
}

impl LightSettings {
    pub fn from_configuration(config: &LightConfiguration, control: ControlSource) -> Self {
        Self {
            day_lights: lamp_name(config.day.lamps),
            night_lights: lamp_name(config.night.lamps),
            day_blink: config.day.blink,
            night_blink: config.night.blink,
            blink_frequency: config.blink_period_ms,
            control_mode: control,
        }
    }

    /// Konfiguration aus den Texten; die Periode wird hier nicht geprüft
    pub fn to_configuration(&self) -> LightConfiguration {
        LightConfiguration {
            day: LightProfile::new(LampSet::parse(&self.day_lights), self.day_blink),
            night: LightProfile::new(LampSet::parse(&self.night_lights), self.night_blink),
            blink_period_ms: self.blink_frequency,
        }
    }

    /// Dekodiert ein JSON-Dokument
    pub fn from_json(data: &[u8]) -> Result<Self, InvalidValue> {
        serde_json_core::from_slice::<Self>(data)
            .map(|(settings, _)| settings)
            .map_err(|_| InvalidValue)
    }

    /// Kodiert als JSON nach `buf`, gibt die Länge zurück
    pub fn to_json(&self, buf: &mut [u8]) -> Result<usize, InvalidValue> {
        serde_json_core::to_slice(self, buf).map_err(|_| InvalidValue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lamp_name() {
        assert_eq!(lamp_name(LampSet::ALL).as_str(), "FRONT+DRL+REAR");
        assert_eq!(lamp_name(LampSet::NONE).as_str(), "NONE");
    }

    #[test]
    fn test_settings_json_shape() {
        let settings =
            LightSettings::from_configuration(&LightConfiguration::default(), ControlSource::Smart);
        let mut buf = [0u8; 256];
        let len = settings.to_json(&mut buf).unwrap();

        assert_eq!(
            core::str::from_utf8(&buf[..len]).unwrap(),
            r#"{"dayLights":"REAR","nightLights":"FRONT+REAR","dayBlink":true,"nightBlink":false,"blinkFrequency":500,"controlMode":"Smart"}"#
        );
    }

    #[test]
    fn test_settings_from_ui_json() {
        let json = br#"{"dayLights":"DRL+REAR","nightLights":"ALL","dayBlink":false,"nightBlink":true,"blinkFrequency":750}"#;
        let settings = LightSettings::from_json(json).unwrap();
        let config = settings.to_configuration();

        assert_eq!(config.day, LightProfile::new(LampSet::DRL | LampSet::REAR, false));
        assert_eq!(config.night, LightProfile::new(LampSet::ALL, true));
        assert_eq!(config.blink_period_ms, 750);
        assert_eq!(settings.control_mode, ControlSource::Smart);
    }

    #[test]
    fn test_long_lamp_text_ignores_unknown_parts() {
        let json = br#"{"dayLights":"FRONT+DRL+REAR+FOG+HORN","nightLights":"REAR+FOG","dayBlink":false,"nightBlink":false,"blinkFrequency":500}"#;
        let settings = LightSettings::from_json(json).unwrap();

        assert_eq!(settings.day_lights.as_str(), "FRONT+DRL+REAR");
        assert_eq!(settings.night_lights.as_str(), "REAR");
        assert_eq!(settings.to_configuration().day.lamps, LampSet::ALL);
    }
}
