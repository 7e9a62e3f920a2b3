//! Lichtsteuerung: Modus, Profile, Blink-Takt und Persistenz
//!
//! Der Controller wird aus einer einzigen Schleife bedient: Setter und
//! `update()` laufen jeweils vollständig durch, bevor der nächste Aufruf
//! kommt. Mehrere Threads müssen den Zugriff extern serialisieren.

use crate::logic::{LampOutputs, blink_due, compute_outputs};
use crate::protocol::LightSettings;
use crate::storage::{LIGHT_CONFIG_KEY, LightConfigRecord, load_record, save_record};
use crate::traits::{ConfigStore, LampDriver, StoreError};
use crate::types::{
    ControlSource, InvalidValue, Lamp, LampSet, LightCommand, LightConfiguration, LightMode,
    LightProfile, LightStatus, RuntimeLightState, is_valid_blink_period,
};

/// Lichtsteuerung für Front-, Tagfahr- und Rücklicht
///
/// # Trait-basierte Abstraktion
/// - `D: LampDriver` - echte Pins oder Mock
/// - `S: ConfigStore` - Flash, Datei, RAM oder Mock
pub struct LightController<D: LampDriver, S: ConfigStore> {
    driver: D,
    store: S,
    config: LightConfiguration,
    mode: LightMode,
    control: ControlSource,
    /// Soll-Zustand aus Modus + Profil
    outputs: LampOutputs,
    /// Zuletzt geschriebene Pegel (Front, DRL, Rear)
    levels: [bool; 3],
    blink_phase: bool,
    /// `None` = Blinken gerade aktiviert, nächstes `update()` schaltet sofort
    last_flip_ms: Option<u32>,
    config_mode: bool,
}

impl<D: LampDriver, S: ConfigStore> LightController<D, S> {
    /// Erstellt den Controller, schaltet alle Lampen aus und lädt die Konfiguration
    ///
    /// Fehlt der Datensatz oder ist er beschädigt, werden die Defaults
    /// verwendet und sofort gespeichert. Der Modus startet immer mit OFF.
    pub fn new(driver: D, store: S) -> Self {
        let mut controller = Self {
            driver,
            store,
            config: LightConfiguration::default(),
            mode: LightMode::Off,
            control: ControlSource::default(),
            outputs: LampOutputs::default(),
            levels: [false; 3],
            blink_phase: false,
            last_flip_ms: None,
            config_mode: false,
        };

        for lamp in Lamp::ALL {
            controller.drive(lamp, false);
        }

        if let Err(e) = controller.load_config() {
            warn!("Lights: no usable configuration ({}), using defaults", e);
            controller.config = LightConfiguration::default();
            if let Err(e) = controller.save_config() {
                error!("Lights: saving default configuration failed: {}", e);
            }
        }

        info!(
            "Lights: day={} blink={}, night={} blink={}, period={}ms",
            controller.config.day.lamps,
            controller.config.day.blink,
            controller.config.night.lamps,
            controller.config.night.blink,
            controller.config.blink_period_ms
        );

        controller
    }

    // ========================================================================
    // Getter
    // ========================================================================

    pub fn mode(&self) -> LightMode {
        self.mode
    }

    pub fn configuration(&self) -> &LightConfiguration {
        &self.config
    }

    pub fn day_profile(&self) -> LightProfile {
        self.config.day
    }

    pub fn night_profile(&self) -> LightProfile {
        self.config.night
    }

    pub fn blink_period_ms(&self) -> u16 {
        self.config.blink_period_ms
    }

    pub fn control_source(&self) -> ControlSource {
        self.control
    }

    pub fn is_config_mode(&self) -> bool {
        self.config_mode
    }

    /// Soll-Zustand aus Modus und Profil (ohne Konfigurationsmodus)
    pub fn outputs(&self) -> LampOutputs {
        self.outputs
    }

    /// Zuletzt geschriebener Pegel eines Ausgangs
    pub fn level(&self, lamp: Lamp) -> bool {
        self.levels[lamp.index()]
    }

    pub fn runtime_state(&self) -> RuntimeLightState {
        RuntimeLightState {
            mode: self.mode,
            front_on: self.level(Lamp::Front),
            drl_on: self.level(Lamp::Drl),
            rear_on: self.level(Lamp::Rear),
            blink_phase: self.blink_phase,
            last_phase_flip_ms: self.last_flip_ms,
            config_override_active: self.config_mode,
        }
    }

    pub fn status(&self) -> LightStatus {
        LightStatus {
            mode: self.mode,
            front: self.level(Lamp::Front),
            drl: self.level(Lamp::Drl),
            rear: self.level(Lamp::Rear),
            blinking: self.outputs.blink && !self.config_mode,
            config_mode: self.config_mode,
            control: self.control,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gibt Treiber und Speicher zurück
    pub fn release(self) -> (D, S) {
        (self.driver, self.store)
    }

    // ========================================================================
    // Modus
    // ========================================================================

    /// Setzt den Modus und aktualisiert sofort die Ausgänge (nicht persistiert)
    pub fn set_mode(&mut self, mode: LightMode) {
        debug!("Lights: mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.recompute_outputs();
    }

    /// Setzt den Modus aus einem Rohwert (0 = OFF, 1 = DAY, 2 = NIGHT)
    pub fn set_mode_raw(&mut self, value: u8) -> Result<(), InvalidValue> {
        let mode = LightMode::try_from(value).inspect_err(|_| {
            warn!("Lights: rejected mode value {}", value);
        })?;
        self.set_mode(mode);
        Ok(())
    }

    /// Schaltet weiter: OFF → DAY → NIGHT → OFF
    pub fn cycle_mode(&mut self) {
        self.set_mode(self.mode.next());
    }

    // ========================================================================
    // Konfiguration
    // ========================================================================

    /// Setzt das Tagprofil und speichert die Konfiguration
    ///
    /// Schlägt das Speichern fehl, bleibt die neue Konfiguration trotzdem aktiv.
    pub fn set_day_config(&mut self, lamps: LampSet, blink: bool) {
        info!("Lights: day config {} -> {}, blink={}", self.config.day.lamps, lamps, blink);
        self.config.day = LightProfile::new(lamps, blink);
        if self.mode == LightMode::Day {
            self.recompute_outputs();
        }
        self.persist();
    }

    /// Setzt das Nachtprofil und speichert die Konfiguration
    pub fn set_night_config(&mut self, lamps: LampSet, blink: bool) {
        info!(
            "Lights: night config {} -> {}, blink={}",
            self.config.night.lamps, lamps, blink
        );
        self.config.night = LightProfile::new(lamps, blink);
        if self.mode == LightMode::Night {
            self.recompute_outputs();
        }
        self.persist();
    }

    /// Setzt die Blink-Periode, Werte außerhalb `[100, 2000]` ms werden abgelehnt
    pub fn set_blink_period(&mut self, period_ms: u16) -> Result<(), InvalidValue> {
        if !is_valid_blink_period(period_ms) {
            warn!("Lights: rejected blink period {}ms", period_ms);
            return Err(InvalidValue);
        }

        info!("Lights: blink period {}ms", period_ms);
        self.config.blink_period_ms = period_ms;
        self.persist();
        Ok(())
    }

    pub fn set_control_source(&mut self, control: ControlSource) {
        info!("Lights: control source {}", control.as_str());
        self.control = control;
    }

    /// Ersetzt die gesamte Konfiguration und speichert einmal
    pub fn set_configuration(&mut self, config: LightConfiguration) -> Result<(), InvalidValue> {
        if !is_valid_blink_period(config.blink_period_ms) {
            warn!("Lights: rejected configuration, period {}ms", config.blink_period_ms);
            return Err(InvalidValue);
        }

        self.config = config;
        self.recompute_outputs();
        self.persist();
        Ok(())
    }

    /// Aktuelle Einstellungen in Textdarstellung
    pub fn settings(&self) -> LightSettings {
        LightSettings::from_configuration(&self.config, self.control)
    }

    /// Übernimmt Einstellungen; bei ungültiger Periode wird nichts geändert
    pub fn apply_settings(&mut self, settings: &LightSettings) -> Result<(), InvalidValue> {
        self.set_configuration(settings.to_configuration())?;
        self.control = settings.control_mode;
        Ok(())
    }

    /// Lädt die Konfiguration aus dem Speicher (fehlende Felder → Defaults)
    pub fn load_config(&mut self) -> Result<(), StoreError> {
        let record: LightConfigRecord = load_record(&mut self.store, LIGHT_CONFIG_KEY)?;
        self.config = record.to_configuration();
        self.recompute_outputs();
        Ok(())
    }

    /// Speichert die komplette Konfiguration
    pub fn save_config(&mut self) -> Result<(), StoreError> {
        let record = LightConfigRecord::from(&self.config);
        save_record(&mut self.store, LIGHT_CONFIG_KEY, &record)?;
        debug!("Lights: configuration saved");
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save_config() {
            error!("Lights: saving configuration failed: {}", e);
        }
    }

    // ========================================================================
    // Konfigurationsmodus
    // ========================================================================

    /// Alle Lampen an, `update()` pausiert
    pub fn activate_config_mode(&mut self) {
        if self.config_mode {
            return;
        }

        info!("Lights: config mode on");
        self.config_mode = true;
        for lamp in Lamp::ALL {
            self.drive(lamp, LampOutputs::ALL_ON.level(lamp));
        }
    }

    /// Zurück zu den Ausgängen des aktuellen Modus
    pub fn deactivate_config_mode(&mut self) {
        if !self.config_mode {
            return;
        }

        info!("Lights: config mode off");
        self.config_mode = false;
        self.recompute_outputs();
    }

    pub fn toggle_config_mode(&mut self) {
        if self.config_mode {
            self.deactivate_config_mode();
        } else {
            self.activate_config_mode();
        }
    }

    // ========================================================================
    // Kommandos & Polling
    // ========================================================================

    /// Führt ein Kommando aus
    pub fn apply(&mut self, command: LightCommand) -> Result<(), InvalidValue> {
        match command {
            LightCommand::SetMode(mode) => self.set_mode(mode),
            LightCommand::CycleMode => self.cycle_mode(),
            LightCommand::SetDayProfile(profile) => {
                self.set_day_config(profile.lamps, profile.blink)
            }
            LightCommand::SetNightProfile(profile) => {
                self.set_night_config(profile.lamps, profile.blink)
            }
            LightCommand::SetBlinkPeriod(period_ms) => self.set_blink_period(period_ms)?,
            LightCommand::EnterConfigMode => self.activate_config_mode(),
            LightCommand::ExitConfigMode => self.deactivate_config_mode(),
            LightCommand::ToggleConfigMode => self.toggle_config_mode(),
            LightCommand::SetControlSource(control) => self.set_control_source(control),
        }
        Ok(())
    }

    /// Polling-Hook, mindestens alle 50 ms aufrufen
    ///
    /// `now_ms` ist ein monotoner Millisekunden-Zähler, Überlauf erlaubt.
    pub fn update(&mut self, now_ms: u32) {
        if self.config_mode {
            return;
        }

        if !self.outputs.blink {
            self.drive(Lamp::Rear, self.outputs.rear);
            return;
        }

        let due = match self.last_flip_ms {
            None => true,
            Some(last_ms) => blink_due(now_ms, last_ms, self.config.blink_period_ms),
        };

        if due {
            self.blink_phase = !self.blink_phase;
            self.last_flip_ms = Some(now_ms);
            self.drive(Lamp::Rear, self.blink_phase);
        }
    }

    /// Berechnet den Soll-Zustand neu und schreibt ihn auf die Pins
    ///
    /// Front und DRL werden sofort geschrieben. Das Rücklicht bekommt beim
    /// Blinken die aktuelle Phase, sonst den statischen Wert.
    fn recompute_outputs(&mut self) {
        let was_blinking = self.outputs.blink;
        self.outputs = compute_outputs(self.mode, &self.config);

        if self.outputs.blink && !was_blinking {
            self.blink_phase = false;
            self.last_flip_ms = None;
        }

        if self.config_mode {
            return;
        }

        self.drive(Lamp::Front, self.outputs.front);
        self.drive(Lamp::Drl, self.outputs.drl);
        let rear = if self.outputs.blink {
            self.blink_phase
        } else {
            self.outputs.rear
        };
        self.drive(Lamp::Rear, rear);
    }

    fn drive(&mut self, lamp: Lamp, on: bool) {
        match self.driver.set_lamp(lamp, on) {
            Ok(()) => self.levels[lamp.index()] = on,
            Err(e) => error!("Lights: writing {} failed: {}", lamp, e),
        }
    }
}
