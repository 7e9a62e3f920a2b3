//! Integration Tests für die Lichtsteuerung
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen MockLampDriver/MockStore

mod common;

use common::{MockLampDriver, MockStore};
use lights_core::{
    ControlSource, InvalidValue, LIGHT_CONFIG_KEY, LampSet, LightCommand, LightConfiguration,
    LightController, LightMode, LightProfile, LightSettings, StoreError,
};

fn controller() -> LightController<MockLampDriver, MockStore> {
    LightController::new(MockLampDriver::new(), MockStore::new())
}

// ============================================================================
// Tests: Start
// ============================================================================

#[test]
fn test_fresh_device_starts_off_with_defaults() {
    let lights = controller();

    assert_eq!(lights.mode(), LightMode::Off);
    assert_eq!(lights.configuration(), &LightConfiguration::default());
    assert_eq!(lights.driver().levels(), (false, false, false));
    assert!(!lights.is_config_mode());
}

#[test]
fn test_fresh_device_saves_defaults_once() {
    let lights = controller();

    assert_eq!(lights.store().write_count, 1);
    assert_eq!(
        lights.store().record(LIGHT_CONFIG_KEY).unwrap(),
        r#"{"dayConfig":4,"nightConfig":5,"dayBlink":true,"nightBlink":false,"blinkFrequency":500}"#
    );
}

#[test]
fn test_partial_record_keeps_present_fields() {
    let store = MockStore::with_record(LIGHT_CONFIG_KEY, br#"{"dayConfig":3}"#);
    let lights = LightController::new(MockLampDriver::new(), store);

    assert_eq!(lights.day_profile(), LightProfile::new(LampSet::FRONT | LampSet::DRL, true));
    assert_eq!(lights.night_profile(), LightProfile::new(LampSet::FRONT | LampSet::REAR, false));
    assert_eq!(lights.blink_period_ms(), 500);
    // vorhandener Datensatz wird beim Start nicht überschrieben
    assert_eq!(lights.store().write_count, 0);
}

#[test]
fn test_out_of_range_fields_fall_back_individually() {
    let store = MockStore::with_record(
        LIGHT_CONFIG_KEY,
        br#"{"dayConfig":9,"nightConfig":2,"dayBlink":false,"blinkFrequency":5000}"#,
    );
    let lights = LightController::new(MockLampDriver::new(), store);

    assert_eq!(lights.day_profile(), LightProfile::new(LampSet::REAR, false));
    assert_eq!(lights.night_profile(), LightProfile::new(LampSet::DRL, false));
    assert_eq!(lights.blink_period_ms(), 500);
}

#[test]
fn test_corrupt_record_is_replaced_by_defaults() {
    let store = MockStore::with_record(LIGHT_CONFIG_KEY, b"{not json");
    let lights = LightController::new(MockLampDriver::new(), store);

    assert_eq!(lights.configuration(), &LightConfiguration::default());
    assert_eq!(lights.store().write_count, 1);
    assert!(lights.store().record(LIGHT_CONFIG_KEY).unwrap().contains("\"dayConfig\":4"));
}

#[test]
fn test_unavailable_storage_still_runs_with_defaults() {
    let mut store = MockStore::new();
    store.fail_reads = Some(StoreError::StorageUnavailable);
    store.fail_writes = Some(StoreError::StorageUnavailable);

    let mut lights = LightController::new(MockLampDriver::new(), store);
    assert_eq!(lights.configuration(), &LightConfiguration::default());

    lights.set_mode(LightMode::Night);
    assert_eq!(lights.driver().levels(), (true, false, true));
}

#[test]
fn test_configuration_survives_restart() {
    let mut lights = controller();
    lights.set_day_config(LampSet::DRL | LampSet::REAR, true);
    lights.set_night_config(LampSet::ALL, false);
    lights.set_blink_period(750).unwrap();

    let (_, store) = lights.release();
    let lights = LightController::new(MockLampDriver::new(), store);

    assert_eq!(lights.day_profile(), LightProfile::new(LampSet::DRL | LampSet::REAR, true));
    assert_eq!(lights.night_profile(), LightProfile::new(LampSet::ALL, false));
    assert_eq!(lights.blink_period_ms(), 750);
    // Modus wird nicht persistiert
    assert_eq!(lights.mode(), LightMode::Off);
}

// ============================================================================
// Tests: Modus
// ============================================================================

#[test]
fn test_cycle_mode_order() {
    let mut lights = controller();

    lights.cycle_mode();
    assert_eq!(lights.mode(), LightMode::Day);
    lights.cycle_mode();
    assert_eq!(lights.mode(), LightMode::Night);
    lights.cycle_mode();
    assert_eq!(lights.mode(), LightMode::Off);
}

#[test]
fn test_mode_outputs() {
    let mut lights = controller();

    lights.set_mode(LightMode::Night);
    lights.update(0);
    assert_eq!(lights.driver().levels(), (true, false, true));

    lights.set_mode(LightMode::Off);
    lights.update(20);
    assert_eq!(lights.driver().levels(), (false, false, false));
}

#[test]
fn test_set_mode_raw_rejects_unknown_value() {
    let mut lights = controller();

    assert_eq!(lights.set_mode_raw(2), Ok(()));
    assert_eq!(lights.mode(), LightMode::Night);
    assert_eq!(lights.set_mode_raw(3), Err(InvalidValue));
    assert_eq!(lights.mode(), LightMode::Night);
}

#[test]
fn test_mode_change_is_not_persisted() {
    let mut lights = controller();
    let writes = lights.store().write_count;

    lights.cycle_mode();
    lights.cycle_mode();

    assert_eq!(lights.store().write_count, writes);
}

// ============================================================================
// Tests: Blinken
// ============================================================================

#[test]
fn test_day_blink_sequence() {
    let mut lights = controller();
    lights.set_mode(LightMode::Day);

    let mut rear = Vec::new();
    for now in [0, 500, 1000, 1500] {
        lights.update(now);
        rear.push(lights.driver().rear);
    }

    assert_eq!(rear, vec![true, false, true, false]);
    assert!(!lights.driver().front);
    assert!(!lights.driver().drl);
}

#[test]
fn test_blink_holds_phase_between_periods() {
    let mut lights = controller();
    lights.set_mode(LightMode::Day);

    lights.update(0);
    for now in (20..500).step_by(20) {
        lights.update(now);
        assert!(lights.driver().rear, "rear flipped early at {now}");
    }
    lights.update(500);
    assert!(!lights.driver().rear);
}

#[test]
fn test_blink_across_timer_wraparound() {
    let mut lights = controller();
    lights.set_mode(LightMode::Day);

    let start = u32::MAX - 199;
    lights.update(start);
    assert!(lights.driver().rear);

    // noch vor dem Überlauf, erst 100 ms vergangen
    lights.update(start.wrapping_add(100));
    assert!(lights.driver().rear);

    lights.update(start.wrapping_add(500));
    assert!(!lights.driver().rear);
    assert_eq!(lights.runtime_state().last_phase_flip_ms, Some(300));
}

#[test]
fn test_blink_without_rear_keeps_rear_off() {
    let mut lights = controller();
    lights.set_day_config(LampSet::DRL, true);
    lights.set_mode(LightMode::Day);

    for now in [0, 500, 1000] {
        lights.update(now);
        assert_eq!(lights.driver().levels(), (false, true, false));
    }
    assert!(!lights.status().blinking);
}

#[test]
fn test_blink_period_change_applies_to_next_flip() {
    let mut lights = controller();
    lights.set_mode(LightMode::Day);
    lights.update(0);

    lights.set_blink_period(1000).unwrap();
    lights.update(500);
    assert!(lights.driver().rear);
    lights.update(1000);
    assert!(!lights.driver().rear);
}

#[test]
fn test_blink_period_bounds() {
    let mut lights = controller();
    let writes = lights.store().write_count;

    for period in [50, 99, 2001, 5000] {
        assert_eq!(lights.set_blink_period(period), Err(InvalidValue));
    }
    assert_eq!(lights.blink_period_ms(), 500);
    assert_eq!(lights.store().write_count, writes);

    for period in [100, 1000, 2000] {
        assert_eq!(lights.set_blink_period(period), Ok(()));
        assert_eq!(lights.blink_period_ms(), period);
    }
}

// ============================================================================
// Tests: Konfiguration
// ============================================================================

#[test]
fn test_day_config_applies_immediately_in_day_mode() {
    let mut lights = controller();
    lights.set_mode(LightMode::Day);

    lights.set_day_config(LampSet::FRONT | LampSet::DRL, false);

    assert_eq!(lights.driver().levels(), (true, true, false));
}

#[test]
fn test_night_config_does_not_touch_day_outputs() {
    let mut lights = controller();
    lights.set_mode(LightMode::Day);
    lights.update(0);

    lights.set_night_config(LampSet::ALL, false);

    assert_eq!(lights.driver().levels(), (false, false, true));
    assert_eq!(lights.night_profile(), LightProfile::new(LampSet::ALL, false));
}

#[test]
fn test_failed_save_keeps_new_configuration() {
    let (driver, mut store) = controller().release();
    store.fail_writes = Some(StoreError::PartialWrite);
    let mut lights = LightController::new(driver, store);
    lights.set_mode(LightMode::Night);

    lights.set_night_config(LampSet::FRONT | LampSet::DRL, false);

    assert_eq!(lights.night_profile(), LightProfile::new(LampSet::FRONT | LampSet::DRL, false));
    assert_eq!(lights.driver().levels(), (true, true, false));
}

#[test]
fn test_apply_settings_rejects_whole_document() {
    let mut lights = controller();
    let mut settings = lights.settings();
    settings.day_lights = "FRONT".try_into().unwrap();
    settings.blink_frequency = 50;

    assert_eq!(lights.apply_settings(&settings), Err(InvalidValue));
    assert_eq!(lights.configuration(), &LightConfiguration::default());
}

#[test]
fn test_apply_settings_from_json() {
    let mut lights = controller();
    let json = br#"{"dayLights":"DRL+REAR","nightLights":"ALL","dayBlink":false,"nightBlink":true,"blinkFrequency":250,"controlMode":"Controller"}"#;
    let settings = LightSettings::from_json(json).unwrap();

    lights.apply_settings(&settings).unwrap();

    assert_eq!(lights.day_profile(), LightProfile::new(LampSet::DRL | LampSet::REAR, false));
    assert_eq!(lights.night_profile(), LightProfile::new(LampSet::ALL, true));
    assert_eq!(lights.blink_period_ms(), 250);
    assert_eq!(lights.control_source(), ControlSource::Controller);
    assert_eq!(lights.settings().night_lights.as_str(), "FRONT+DRL+REAR");
}

// ============================================================================
// Tests: Konfigurationsmodus
// ============================================================================

#[test]
fn test_config_mode_turns_everything_on() {
    let mut lights = controller();
    lights.activate_config_mode();

    assert!(lights.is_config_mode());
    assert_eq!(lights.driver().levels(), (true, true, true));
}

#[test]
fn test_config_mode_freezes_blinking() {
    let mut lights = controller();
    lights.set_mode(LightMode::Day);
    lights.update(0);
    lights.activate_config_mode();

    let writes = lights.driver().write_count;
    for now in [500, 1000, 1500] {
        lights.update(now);
    }

    assert_eq!(lights.driver().levels(), (true, true, true));
    assert_eq!(lights.driver().write_count, writes);
}

#[test]
fn test_config_mode_is_idempotent() {
    let mut lights = controller();
    lights.activate_config_mode();
    let writes = lights.driver().write_count;

    lights.activate_config_mode();
    assert_eq!(lights.driver().write_count, writes);

    lights.deactivate_config_mode();
    lights.deactivate_config_mode();
    assert!(!lights.is_config_mode());
}

#[test]
fn test_leaving_config_mode_restores_mode_outputs() {
    let mut lights = controller();
    lights.set_mode(LightMode::Night);
    lights.activate_config_mode();

    lights.deactivate_config_mode();

    assert_eq!(lights.driver().levels(), (true, false, true));
}

#[test]
fn test_leaving_config_mode_resumes_blinking() {
    let mut lights = controller();
    lights.set_mode(LightMode::Day);
    lights.update(0);
    assert!(lights.driver().rear);

    lights.activate_config_mode();
    lights.update(500);
    lights.update(1000);
    lights.deactivate_config_mode();

    // Phase von vor dem Konfigurationsmodus, Front und DRL laut Tagprofil
    assert_eq!(lights.driver().levels(), (false, false, true));
    assert_eq!(lights.runtime_state().last_phase_flip_ms, Some(0));

    lights.update(1020);
    assert!(!lights.driver().rear);
    lights.update(1300);
    assert!(!lights.driver().rear);
    lights.update(1520);
    assert!(lights.driver().rear);
}

#[test]
fn test_setters_in_config_mode_apply_after_exit() {
    let mut lights = controller();
    lights.activate_config_mode();

    lights.set_mode(LightMode::Night);
    lights.set_night_config(LampSet::DRL, false);
    assert_eq!(lights.driver().levels(), (true, true, true));

    lights.deactivate_config_mode();
    assert_eq!(lights.driver().levels(), (false, true, false));
}

// ============================================================================
// Tests: Kommandos & Status
// ============================================================================

#[test]
fn test_text_commands() {
    assert_eq!(LightCommand::try_from("night"), Ok(LightCommand::SetMode(LightMode::Night)));
    assert_eq!(LightCommand::try_from("config"), Ok(LightCommand::ToggleConfigMode));
    assert_eq!(LightCommand::try_from("NIGHT"), Err(InvalidValue));
}

#[test]
fn test_apply_commands() {
    let mut lights = controller();

    lights.apply(LightCommand::CycleMode).unwrap();
    assert_eq!(lights.mode(), LightMode::Day);

    lights.apply(LightCommand::ToggleConfigMode).unwrap();
    assert!(lights.is_config_mode());
    lights.apply(LightCommand::ExitConfigMode).unwrap();
    assert!(!lights.is_config_mode());

    assert_eq!(lights.apply(LightCommand::SetBlinkPeriod(5)), Err(InvalidValue));

    lights
        .apply(LightCommand::SetControlSource(ControlSource::Controller))
        .unwrap();
    assert_eq!(lights.control_source(), ControlSource::Controller);
}

#[test]
fn test_status_snapshot() {
    let mut lights = controller();
    lights.set_mode(LightMode::Day);
    lights.update(0);

    let status = lights.status();
    assert_eq!(status.mode, LightMode::Day);
    assert!(status.rear);
    assert!(status.blinking);
    assert!(!status.config_mode);
    assert_eq!(status.control, ControlSource::Smart);
}

#[test]
fn test_pin_failure_does_not_stop_controller() {
    let mut lights = controller();
    let (mut driver, store) = lights.release();
    driver.fail_next_write = true;
    lights = LightController::new(driver, store);

    lights.set_mode(LightMode::Night);
    lights.update(0);

    assert_eq!(lights.driver().levels(), (true, false, true));
}
