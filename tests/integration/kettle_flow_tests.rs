//! On/off control, pairing button and network handling through the full
//! service: poll loop → FSM → kettle button line and protocol reports.

use kettlebridge::app::attributes::{AttributeId, AttributeValue};
use kettlebridge::app::commands::CommandStatus;
use kettlebridge::app::events::AppEvent;
use kettlebridge::app::ports::OutputLine;
use kettlebridge::error::Error;
use kettlebridge::events::{COMMAND_QUEUE_CAP, EVENT_QUEUE_CAP, Event};
use kettlebridge::fsm::KettleState;

use crate::mock_hw::{MockHw, MockStorage};
use crate::rig::Rig;

const ON: AttributeValue = AttributeValue::Bool(true);
const OFF: AttributeValue = AttributeValue::Bool(false);

fn declined(rig: &Rig) -> usize {
    rig.sink
        .count(|e| matches!(e, AppEvent::CommandDeclined { .. }))
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_reports_initial_off_state() {
    let rig = Rig::started();

    assert_eq!(rig.service.state(), KettleState::Off);
    assert_eq!(rig.on_off_reports(), vec![OFF]);
    assert_eq!(
        rig.protocol.immediate(AttributeId::SystemMode),
        vec![AttributeValue::Enum8(0)]
    );
    assert_eq!(
        rig.protocol.published(AttributeId::HeatingSetpoint),
        vec![AttributeValue::I16(8000)]
    );
    assert_eq!(rig.sink.events[0], AppEvent::Started(KettleState::Off));
    // Kettle button line parked low, never pressed.
    assert_eq!(rig.hw.level(OutputLine::KettleButton), Some(false));
    assert_eq!(rig.hw.kettle_presses(), 0);
}

#[test]
fn startup_follows_heating_line() {
    let mut hw = MockHw::new();
    hw.heating = true;
    let mut rig = Rig::with(hw, MockStorage::new());
    rig.start();

    assert_eq!(rig.service.state(), KettleState::On);
    assert_eq!(rig.on_off_reports(), vec![ON]);
    assert_eq!(
        rig.protocol.immediate(AttributeId::SystemMode),
        vec![AttributeValue::Enum8(4)]
    );
}

#[test]
fn unreadable_heating_line_is_fatal() {
    let mut hw = MockHw::new();
    hw.heating_fails = true;
    let mut rig = Rig::with(hw, MockStorage::new());
    let result = rig.service.start(
        0,
        &mut rig.hw,
        &mut rig.protocol,
        &mut rig.storage,
        &mut rig.sink,
    );
    assert_eq!(result, Err(Error::Init("kettle state GPIO")));
}

// ── Remote on/off ─────────────────────────────────────────────

#[test]
fn on_request_pulses_and_confirms() {
    let mut rig = Rig::started();
    rig.clear();

    rig.request(true);
    assert_eq!(rig.service.state(), KettleState::TurningOn);
    assert_eq!(rig.hw.kettle_presses(), 1);
    assert!(rig.on_off_reports().is_empty(), "no report before the kettle reacts");

    // Pulse released after 200 ms.
    rig.advance(200);
    assert_eq!(rig.hw.level(OutputLine::KettleButton), Some(false));

    rig.hw.heating = true;
    rig.advance(50);
    assert_eq!(rig.service.state(), KettleState::On);
    assert_eq!(rig.on_off_reports(), vec![ON]);

    // The cancelled timeout never fires.
    rig.advance(6000);
    assert_eq!(rig.service.state(), KettleState::On);
    assert_eq!(rig.on_off_reports(), vec![ON]);
    assert_eq!(declined(&rig), 0);
}

#[test]
fn repeated_on_request_is_idempotent() {
    let mut rig = Rig::started();
    rig.clear();

    rig.request(true);
    rig.request(true);
    assert_eq!(rig.hw.kettle_presses(), 1);

    rig.advance(5000);
    assert_eq!(rig.service.state(), KettleState::Off);
    assert_eq!(declined(&rig), 1);
    assert_eq!(rig.on_off_reports(), vec![OFF]);
}

#[test]
fn ignored_on_request_times_out_without_second_pulse() {
    let mut rig = Rig::started();
    rig.clear();

    rig.request(true);
    rig.advance(4950);
    assert_eq!(rig.service.state(), KettleState::TurningOn);
    assert!(rig.on_off_reports().is_empty());

    rig.advance(50);
    assert_eq!(rig.service.state(), KettleState::Off);
    assert_eq!(rig.on_off_reports(), vec![OFF]);
    assert_eq!(rig.hw.kettle_presses(), 1);
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::CommandDeclined { requested_on: true }),
        1
    );
}

#[test]
fn round_trip_reports_once_each_way() {
    let mut rig = Rig::started();
    rig.clear();

    rig.request(true);
    rig.hw.heating = true;
    rig.advance(50);
    assert_eq!(rig.service.state(), KettleState::On);

    rig.request(false);
    assert_eq!(rig.service.state(), KettleState::TurningOff);
    rig.hw.heating = false;
    rig.advance(50);
    assert_eq!(rig.service.state(), KettleState::Off);

    assert_eq!(rig.on_off_reports(), vec![ON, OFF]);
    assert_eq!(rig.hw.kettle_presses(), 2);

    rig.advance(6000);
    assert_eq!(rig.on_off_reports(), vec![ON, OFF]);
}

#[test]
fn confirming_edge_beats_timeout_in_same_pass() {
    let mut rig = Rig::started();
    rig.clear();

    rig.request(true);
    rig.advance(4950);
    // Line rises in the very poll where the timeout expires.
    rig.hw.heating = true;
    rig.advance(50);

    assert_eq!(rig.service.state(), KettleState::On);
    assert_eq!(rig.on_off_reports(), vec![ON]);
    assert_eq!(declined(&rig), 0);
}

#[test]
fn off_request_supersedes_pending_on() {
    let mut rig = Rig::started();
    rig.clear();

    rig.request(true);
    rig.request(false);
    assert_eq!(rig.service.state(), KettleState::TurningOff);
    assert_eq!(rig.hw.kettle_presses(), 2);

    rig.advance(5000);
    assert_eq!(rig.service.state(), KettleState::Off);
    assert_eq!(rig.on_off_reports(), vec![OFF]);
    assert_eq!(declined(&rig), 0);
}

#[test]
fn kettle_that_keeps_heating_declines_off() {
    let mut hw = MockHw::new();
    hw.heating = true;
    let mut rig = Rig::with(hw, MockStorage::new());
    rig.start();
    rig.clear();

    rig.request(false);
    rig.advance(5000);

    assert_eq!(rig.service.state(), KettleState::On);
    assert_eq!(rig.on_off_reports(), vec![ON]);
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::CommandDeclined { requested_on: false }),
        1
    );
}

#[test]
fn manual_button_on_kettle_is_followed() {
    let mut rig = Rig::started();
    rig.clear();

    rig.hw.heating = true;
    rig.advance(50);
    assert_eq!(rig.service.state(), KettleState::On);
    assert_eq!(rig.on_off_reports(), vec![ON]);

    rig.hw.heating = false;
    rig.advance(50);
    assert_eq!(rig.service.state(), KettleState::Off);
    assert_eq!(rig.on_off_reports(), vec![ON, OFF]);
    assert_eq!(rig.hw.kettle_presses(), 0);
}

#[test]
fn missing_kettle_button_still_times_out() {
    let mut hw = MockHw::new();
    hw.missing_outputs.push(OutputLine::KettleButton);
    let mut rig = Rig::with(hw, MockStorage::new());
    rig.start();
    rig.clear();

    rig.request(true);
    assert_eq!(rig.hw.kettle_presses(), 0);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::ButtonPulsed { .. })), 0);

    rig.advance(5000);
    assert_eq!(rig.service.state(), KettleState::Off);
    assert_eq!(declined(&rig), 1);
}

// ── Command status ────────────────────────────────────────────

#[test]
fn unsupported_writes_are_not_implemented() {
    let mut rig = Rig::started();

    assert_eq!(
        rig.service
            .submit_raw_command(0x0300, 0x0007, AttributeValue::Bool(true)),
        CommandStatus::NotImplemented
    );
    assert_eq!(
        rig.command(AttributeId::LocalTemperature, AttributeValue::I16(2000)),
        CommandStatus::NotImplemented
    );
    assert_eq!(
        rig.command(AttributeId::SystemMode, AttributeValue::Enum8(4)),
        CommandStatus::NotImplemented
    );
    assert_eq!(
        rig.command(AttributeId::HeatingSetpoint, AttributeValue::I16(12000)),
        CommandStatus::InvalidValue
    );
    assert_eq!(rig.service.pending_events(), 0);
}

#[test]
fn raw_on_off_write_is_accepted() {
    let mut rig = Rig::started();
    assert_eq!(
        rig.service.submit_raw_command(0x0006, 0x0000, ON),
        CommandStatus::Accepted
    );
    rig.poll();
    assert_eq!(rig.service.state(), KettleState::TurningOn);
}

#[test]
fn full_queue_reports_busy() {
    let mut rig = Rig::started();
    for _ in 0..COMMAND_QUEUE_CAP {
        assert_eq!(rig.command(AttributeId::OnOff, ON), CommandStatus::Accepted);
    }
    assert_eq!(rig.command(AttributeId::OnOff, ON), CommandStatus::Busy);

    // The queued duplicates still collapse into one pulse.
    rig.poll();
    assert_eq!(rig.hw.kettle_presses(), 1);
}

#[test]
fn command_backlog_leaves_room_for_heating_edge() {
    let mut rig = Rig::started();
    rig.clear();

    let mut accepted = 0;
    for _ in 0..EVENT_QUEUE_CAP {
        if rig.command(AttributeId::HeatingSetpoint, AttributeValue::I16(7000))
            == CommandStatus::Accepted
        {
            accepted += 1;
        }
    }
    assert_eq!(accepted, COMMAND_QUEUE_CAP);

    rig.hw.heating = true;
    rig.poll();
    assert_eq!(rig.service.state(), KettleState::On);
    assert_eq!(rig.on_off_reports(), vec![ON]);
}

#[test]
fn heating_edge_lost_to_full_queue_is_seen_next_poll() {
    let mut rig = Rig::started();
    rig.clear();

    for _ in 0..EVENT_QUEUE_CAP {
        assert!(rig.service.push(Event::SensorTick));
    }
    rig.hw.heating = true;
    rig.poll();
    assert_eq!(rig.service.state(), KettleState::Off);
    assert_eq!(rig.service.pending_events(), 0);

    rig.advance(50);
    assert_eq!(rig.service.state(), KettleState::On);
    assert_eq!(rig.on_off_reports(), vec![ON]);
}

#[test]
fn transition_timeout_lost_to_full_queue_fires_next_poll() {
    let mut rig = Rig::started();
    rig.clear();

    rig.request(true);
    rig.advance(4950);
    assert_eq!(rig.service.state(), KettleState::TurningOn);

    for _ in 0..EVENT_QUEUE_CAP {
        assert!(rig.service.push(Event::SensorTick));
    }
    // The timeout expires while there is no room for it.
    rig.advance(50);
    assert_eq!(rig.service.state(), KettleState::TurningOn);

    rig.advance(50);
    assert_eq!(rig.service.state(), KettleState::Off);
    assert_eq!(rig.on_off_reports(), vec![OFF]);
    assert_eq!(declined(&rig), 1);
    assert_eq!(rig.hw.kettle_presses(), 1);
}

// ── Network and pairing button ────────────────────────────────

#[test]
fn join_installs_reporting_and_stops_blinking() {
    let mut rig = Rig::started();
    rig.advance(1000);
    assert!(rig.hw.led_writes() >= 2, "LED blinks while searching");

    rig.join();
    assert!(rig.service.is_joined());
    assert_eq!(rig.protocol.configured().len(), 3);
    assert_eq!(rig.hw.level(OutputLine::StatusLed), Some(false));
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::NetworkChanged { joined: true }),
        1
    );

    let writes = rig.hw.led_writes();
    rig.advance(2000);
    assert_eq!(rig.hw.led_writes(), writes);
}

#[test]
fn long_press_leaves_network() {
    let mut rig = Rig::started();
    rig.join();
    rig.clear();

    rig.hw.pairing = true;
    rig.advance(50);
    rig.advance(3000);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::PairingRequested), 1);

    // Six-toggle acknowledgement burst, then the leave.
    rig.advance(700);
    assert_eq!(rig.hw.led_writes(), 7);
    assert_eq!(rig.hw.level(OutputLine::StatusLed), Some(false));
    assert_eq!(rig.protocol.leaves(), 1);

    rig.service.push(Event::Network { joined: false });
    rig.poll();
    assert!(!rig.service.is_joined());
}

#[test]
fn short_press_is_ignored() {
    let mut rig = Rig::started();
    rig.join();
    rig.clear();

    rig.hw.pairing = true;
    rig.advance(500);
    rig.hw.pairing = false;
    rig.advance(5000);

    assert_eq!(rig.sink.count(|e| *e == AppEvent::PairingRequested), 0);
    assert_eq!(rig.protocol.leaves(), 0);
}

#[test]
fn long_press_without_network_only_blinks() {
    let mut rig = Rig::started();
    rig.clear();

    rig.hw.pairing = true;
    rig.advance(4000);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::PairingRequested), 1);
    assert_eq!(rig.protocol.leaves(), 0);
}

#[test]
fn missing_pairing_button_is_tolerated() {
    let mut hw = MockHw::new();
    hw.pairing_missing = true;
    let mut rig = Rig::with(hw, MockStorage::new());
    rig.start();
    rig.advance(4000);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::PairingRequested), 0);
}
