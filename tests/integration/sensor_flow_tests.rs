//! Dial and water temperature sampling through the full service:
//! ADC → filter → calibration → attribute store → report gate → protocol.

use kettlebridge::app::attributes::{AttributeId, AttributeValue};
use kettlebridge::app::commands::CommandStatus;
use kettlebridge::app::events::AppEvent;
use kettlebridge::sensors::temperature::Temperature;

use crate::mock_hw::{MockHw, MockStorage, raw_for_mv};
use crate::rig::Rig;

const INVALID: AttributeValue = AttributeValue::I16(i16::MIN);

fn temp(centi: i16) -> AttributeValue {
    AttributeValue::I16(centi)
}

fn measured(rig: &Rig) -> Vec<AttributeValue> {
    rig.protocol.published(AttributeId::MeasuredTemperature)
}

// ── Water temperature ─────────────────────────────────────────

#[test]
fn first_sample_publishes_water_temperature() {
    let rig = Rig::started();

    assert_eq!(measured(&rig), vec![INVALID, temp(5000)]);
    assert_eq!(
        rig.protocol.published(AttributeId::LocalTemperature),
        vec![INVALID, temp(5000)]
    );
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::SensorReconnected(Temperature::from_centi(5000))),
        1
    );
}

#[test]
fn off_base_publishes_invalid_once() {
    let mut rig = Rig::started();
    rig.clear();

    rig.hw.water_raw = Some(0);
    rig.advance(5000);
    assert_eq!(measured(&rig), vec![INVALID]);
    assert_eq!(
        rig.protocol.published(AttributeId::LocalTemperature),
        vec![INVALID]
    );
    assert_eq!(rig.sink.count(|e| *e == AppEvent::OffBase), 1);
    assert!(!rig.service.attributes().measured_temperature().is_valid());

    // Back on the base: the filter restarts from the first sample.
    rig.hw.water_raw = Some(raw_for_mv(1900));
    rig.advance(1000);
    assert_eq!(measured(&rig), vec![INVALID, temp(5000)]);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::SensorReconnected(_))),
        1
    );
}

#[test]
fn voltage_below_off_base_threshold_is_invalid() {
    let mut rig = Rig::started();
    rig.clear();

    // 568 counts is 998 mV at the sensor.
    rig.hw.water_raw = Some(568);
    rig.advance(1000);
    assert_eq!(measured(&rig), vec![INVALID]);
}

#[test]
fn change_within_hysteresis_never_publishes() {
    let mut rig = Rig::started();
    rig.clear();

    rig.hw.water_raw = Some(raw_for_mv(1900) + 8);
    rig.advance(20_000);
    assert!(measured(&rig).is_empty());
    assert_eq!(rig.service.attributes().measured_temperature().centi(), 5000);
}

#[test]
fn change_beyond_hysteresis_publishes_once() {
    let mut rig = Rig::started();
    rig.clear();

    rig.hw.water_raw = Some(raw_for_mv(1900) + 12);
    rig.advance(60_000);
    assert_eq!(measured(&rig), vec![temp(5053)]);
    assert_eq!(
        rig.protocol.published(AttributeId::LocalTemperature),
        vec![temp(5053)]
    );
}

#[test]
fn failed_water_read_keeps_last_value() {
    let mut rig = Rig::started();
    rig.clear();

    rig.hw.water_raw = None;
    rig.advance(3000);
    assert!(measured(&rig).is_empty());
    assert_eq!(rig.service.attributes().measured_temperature().centi(), 5000);
}

// ── Target dial ───────────────────────────────────────────────

#[test]
fn dial_at_zero_volts_is_one_hundred_degrees() {
    let mut hw = MockHw::new();
    hw.dial_raw = Some(0);
    let mut rig = Rig::with(hw, MockStorage::new());
    rig.start();

    assert_eq!(rig.service.attributes().heating_setpoint().centi(), 10000);
    assert_eq!(
        rig.protocol.published(AttributeId::HeatingSetpoint),
        vec![temp(8000), temp(10000)]
    );
    assert_eq!(rig.storage.setpoint(), Some(10000));
    assert_eq!(
        rig.sink.count(|e| *e
            == AppEvent::SetpointChanged {
                setpoint: Temperature::from_centi(10000),
                remote: false
            }),
        1
    );
}

#[test]
fn dial_at_five_volts_is_fifty_degrees() {
    let mut hw = MockHw::new();
    hw.dial_raw = Some(raw_for_mv(5000));
    let mut rig = Rig::with(hw, MockStorage::new());
    rig.start();

    assert_eq!(rig.service.attributes().heating_setpoint().centi(), 5000);
    assert_eq!(rig.storage.setpoint(), Some(5000));
}

#[test]
fn dial_jitter_is_not_persisted() {
    let mut rig = Rig::started();
    let saves = rig.storage.saves;

    rig.hw.dial_raw = Some(raw_for_mv(2600) + 3);
    rig.advance(10_000);
    assert_eq!(rig.storage.saves, saves);
    assert_eq!(rig.service.attributes().heating_setpoint().centi(), 8000);
}

// ── Persisted setpoint ────────────────────────────────────────

#[test]
fn stored_setpoint_is_restored() {
    let mut hw = MockHw::new();
    hw.dial_raw = None;
    let mut rig = Rig::with(hw, MockStorage::with_setpoint(6500));
    rig.start();

    assert_eq!(rig.service.attributes().heating_setpoint().centi(), 6500);
    assert_eq!(
        rig.protocol.published(AttributeId::HeatingSetpoint),
        vec![temp(6500)]
    );
    // A dead dial does not stop water sampling.
    assert_eq!(measured(&rig), vec![INVALID, temp(5000)]);
}

#[test]
fn out_of_range_stored_setpoint_falls_back_to_default() {
    let mut hw = MockHw::new();
    hw.dial_raw = None;
    let mut rig = Rig::with(hw, MockStorage::with_setpoint(3000));
    rig.start();

    assert_eq!(rig.service.attributes().heating_setpoint().centi(), 8000);
}

#[test]
fn storage_failure_keeps_in_memory_setpoint() {
    let mut hw = MockHw::new();
    hw.dial_raw = None;
    let mut storage = MockStorage::new();
    storage.fail_io = true;
    let mut rig = Rig::with(hw, storage);
    rig.start();
    assert_eq!(rig.service.attributes().heating_setpoint().centi(), 8000);

    assert_eq!(
        rig.command(AttributeId::HeatingSetpoint, temp(7000)),
        CommandStatus::Accepted
    );
    rig.poll();
    assert_eq!(rig.service.attributes().heating_setpoint().centi(), 7000);
    assert_eq!(rig.storage.setpoint(), None);
}

// ── Remote setpoint writes ────────────────────────────────────

#[test]
fn remote_setpoint_write_is_stored_and_published() {
    let mut hw = MockHw::new();
    hw.dial_raw = None;
    let mut rig = Rig::with(hw, MockStorage::new());
    rig.start();
    rig.clear();

    assert_eq!(
        rig.command(AttributeId::HeatingSetpoint, temp(6000)),
        CommandStatus::Accepted
    );
    rig.poll();

    assert_eq!(rig.service.attributes().heating_setpoint().centi(), 6000);
    assert_eq!(rig.storage.setpoint(), Some(6000));
    assert_eq!(
        rig.protocol.published(AttributeId::HeatingSetpoint),
        vec![temp(6000)]
    );
    assert_eq!(
        rig.sink.count(|e| *e
            == AppEvent::SetpointChanged {
                setpoint: Temperature::from_centi(6000),
                remote: true
            }),
        1
    );
}

#[test]
fn dial_overrides_remote_write_on_next_sample() {
    let mut rig = Rig::started();
    rig.clear();

    rig.command(AttributeId::HeatingSetpoint, temp(6000));
    rig.poll();
    assert_eq!(rig.service.attributes().heating_setpoint().centi(), 6000);

    rig.advance(1000);
    assert_eq!(rig.service.attributes().heating_setpoint().centi(), 8000);
    assert_eq!(
        rig.protocol.published(AttributeId::HeatingSetpoint),
        vec![temp(6000), temp(8000)]
    );
}
