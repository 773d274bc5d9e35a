//! Inbound remote commands.
//!
//! Attribute writes from the network are decoded by the
//! [`dispatcher`](super::dispatcher) into a [`RemoteCommand`], queued, and
//! executed by the [`KettleService`](super::service::KettleService) on its
//! next processing pass.

use serde::{Deserialize, Serialize};

use crate::sensors::temperature::Temperature;

/// A decoded, supported remote command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    /// On/Off cluster write: ask the kettle to start or stop heating.
    SetHeating(bool),
    /// Thermostat heating setpoint write (already range-checked).
    SetHeatingSetpoint(Temperature),
}

/// Synchronous answer returned to the protocol layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandStatus {
    /// Queued for execution.
    Accepted,
    /// Attribute or cluster not handled by this device.
    NotImplemented,
    /// Wrong value type or out of range.
    InvalidValue,
    /// Event queue full; the command was dropped.
    Busy,
}
