//! Fuzz target: `CommandDispatcher::decode_raw`
//!
//! Arbitrary `(cluster, attribute, value)` writes must either decode to a
//! command or be answered with a status; accepted setpoints are in range.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use kettlebridge::app::attributes::AttributeValue;
use kettlebridge::app::commands::{CommandStatus, RemoteCommand};
use kettlebridge::app::dispatcher::CommandDispatcher;
use kettlebridge::sensors::temperature::Temperature;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let &[c0, c1, a0, a1, kind, v0, v1, ..] = data else {
        return;
    };
    let cluster = u16::from_le_bytes([c0, c1]);
    let attribute = u16::from_le_bytes([a0, a1]);
    let value = match kind % 3 {
        0 => AttributeValue::Bool(v0 & 1 == 1),
        1 => AttributeValue::Enum8(v0),
        _ => AttributeValue::I16(i16::from_le_bytes([v0, v1])),
    };

    match CommandDispatcher::decode_raw(cluster, attribute, value) {
        Ok(RemoteCommand::SetHeatingSetpoint(t)) => {
            assert!(t.get().is_some_and(|c| Temperature::SETPOINT_RANGE.contains(c)));
        }
        Ok(RemoteCommand::SetHeating(on)) => assert_eq!(value, AttributeValue::Bool(on)),
        Err(status) => assert_ne!(status, CommandStatus::Accepted),
    }
});
