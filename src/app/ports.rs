//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ KettleService (domain)
//! ```
//!
//! Driven adapters (ADC, GPIO, protocol stack, storage, event sinks)
//! implement these traits.  The [`KettleService`](super::service::KettleService)
//! consumes them via generics, so the domain core never touches hardware
//! or the wireless stack directly.
//!
//! Temperatures cross these boundaries as `i16` centi-degrees with
//! `0x8000` meaning "no reading".

use crate::config::KettleConfig;
use crate::error::{IoError, SensorError, StorageError};
use crate::sensors::Channel;

use super::attributes::{AttributeId, AttributeValue};
use super::report::ReportingSpec;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: ADC → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// One raw 12-bit sample from `channel`.
    fn read_raw(&mut self, channel: Channel) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Digital I/O port (driven adapter: GPIO ↔ domain)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputLine {
    /// High while the kettle's heating element is powered.
    HeatingState,
    /// Pairing button, high while pressed.
    PairingButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputLine {
    /// Drives the transistor across the kettle's own button.
    KettleButton,
    /// Network status LED.
    StatusLed,
}

pub trait DigitalIoPort {
    fn read_level(&mut self, line: InputLine) -> Result<bool, IoError>;

    fn set_level(&mut self, line: OutputLine, high: bool) -> Result<(), IoError>;
}

// ───────────────────────────────────────────────────────────────
// Protocol port (driven adapter: domain → wireless stack)
// ───────────────────────────────────────────────────────────────

/// Outbound half of the remote-control protocol.  Inbound attribute
/// writes reach the domain through
/// [`KettleService::submit_command`](super::service::KettleService::submit_command).
pub trait ProtocolPort {
    /// Update the attribute and leave delivery to background reporting.
    fn publish(&mut self, attr: AttributeId, value: AttributeValue);

    /// Update the attribute and send a report now.
    fn send_immediate(&mut self, attr: AttributeId, value: AttributeValue);

    /// Install background reporting parameters for one attribute.
    fn configure_reporting(&mut self, spec: &ReportingSpec);

    /// Leave the current network so the device can be paired again.
    fn leave_network(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.  Keys look like `"kettle/target_temp"`.
///
/// Write operations MUST be atomic, no partial writes on power loss.  The
/// ESP-IDF NVS API guarantees this natively.
pub trait StoragePort {
    /// Read a value into `buf`.  Returns the number of bytes written.
    fn load(&mut self, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// `Ok(())` even if the key did not exist.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`KettleConfig`].
///
/// Implementations MUST call [`KettleConfig::validate`] before persisting
/// and reject invalid values with [`StorageError::ValidationFailed`]
/// rather than clamping them.
pub trait ConfigPort {
    /// Returns [`KettleConfig::default()`] if nothing is stored.
    fn load(&self) -> Result<KettleConfig, StorageError>;

    fn save(&mut self, config: &KettleConfig) -> Result<(), StorageError>;
}
