//! Attribute-write decoding.
//!
//! Maps `(attribute, value)` pairs from the protocol onto
//! [`RemoteCommand`]s.  Anything not listed below is answered with
//! [`CommandStatus::NotImplemented`]; that is a normal reply, not an error.
//!
//! | Attribute         | Value       | Command                    |
//! |-------------------|-------------|----------------------------|
//! | OnOff             | `Bool`      | `SetHeating`               |
//! | HeatingSetpoint   | `I16` 50–100 °C | `SetHeatingSetpoint`   |

use log::{debug, warn};

use crate::sensors::temperature::Temperature;

use super::attributes::{AttributeId, AttributeValue};
use super::commands::{CommandStatus, RemoteCommand};

pub struct CommandDispatcher;

impl CommandDispatcher {
    pub fn decode(attr: AttributeId, value: AttributeValue) -> Result<RemoteCommand, CommandStatus> {
        match (attr, value) {
            (AttributeId::OnOff, AttributeValue::Bool(on)) => Ok(RemoteCommand::SetHeating(on)),
            (AttributeId::HeatingSetpoint, AttributeValue::I16(centi)) => {
                if Temperature::SETPOINT_RANGE.contains(centi) {
                    Ok(RemoteCommand::SetHeatingSetpoint(Temperature::from_centi(centi)))
                } else {
                    warn!("setpoint write {centi} out of range");
                    Err(CommandStatus::InvalidValue)
                }
            }
            (AttributeId::OnOff | AttributeId::HeatingSetpoint, other) => {
                warn!("{attr}: unexpected value {other:?}");
                Err(CommandStatus::InvalidValue)
            }
            _ => {
                debug!("{attr}: write not supported");
                Err(CommandStatus::NotImplemented)
            }
        }
    }

    /// Same as [`decode`](Self::decode), starting from raw wire ids.
    pub fn decode_raw(
        cluster: u16,
        attribute: u16,
        value: AttributeValue,
    ) -> Result<RemoteCommand, CommandStatus> {
        match AttributeId::from_ids(cluster, attribute) {
            Some(attr) => Self::decode(attr, value),
            None => {
                debug!("unknown attribute {cluster:#06x}/{attribute:#06x}");
                Err(CommandStatus::NotImplemented)
            }
        }
    }
}
