//! Outbound application events.
//!
//! The [`KettleService`](super::service::KettleService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  They describe what the
//! domain decided; the adapter on the other side only renders them.

use crate::fsm::KettleState;
use crate::sensors::temperature::Temperature;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Service started; carries the state derived from the heating line.
    Started(KettleState),

    /// The kettle state machine moved.
    StateChanged { from: KettleState, to: KettleState },

    /// A simulated button press was emitted toward the kettle.
    ButtonPulsed { requested_on: bool },

    /// The kettle did not follow a request within the transition timeout.
    CommandDeclined { requested_on: bool },

    /// Water sensor reading lost (kettle lifted or probe disconnected).
    OffBase,

    /// Water sensor reading is back after [`AppEvent::OffBase`].
    SensorReconnected(Temperature),

    /// Setpoint changed, either from the dial or a remote write.
    SetpointChanged { setpoint: Temperature, remote: bool },

    /// Network join state changed.
    NetworkChanged { joined: bool },

    /// Long press on the pairing button: leaving the network to re-pair.
    PairingRequested,
}
