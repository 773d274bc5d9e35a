//! The externally visible attribute snapshot.
//!
//! A single [`AttributeStore`] is owned by the service and passed by `&mut`
//! to whichever component updates it.  It is the only place the reported
//! values live; the protocol layer sees them through
//! [`AttributeId`]/[`AttributeValue`] pairs.
//!
//! ```text
//!   AttributeId          cluster  attribute
//!   ─────────────────────────────────────────
//!   OnOff                0x0006   0x0000
//!   LocalTemperature     0x0201   0x0000
//!   HeatingSetpoint      0x0201   0x0012
//!   SystemMode           0x0201   0x001C
//!   MeasuredTemperature  0x0402   0x0000
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::sensors::temperature::Temperature;

// ───────────────────────────────────────────────────────────────
// Identifiers and values
// ───────────────────────────────────────────────────────────────

pub const CLUSTER_ON_OFF: u16 = 0x0006;
pub const CLUSTER_THERMOSTAT: u16 = 0x0201;
pub const CLUSTER_TEMPERATURE_MEASUREMENT: u16 = 0x0402;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AttributeId {
    OnOff = 0,
    SystemMode = 1,
    LocalTemperature = 2,
    HeatingSetpoint = 3,
    MeasuredTemperature = 4,
}

impl AttributeId {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::OnOff,
        Self::SystemMode,
        Self::LocalTemperature,
        Self::HeatingSetpoint,
        Self::MeasuredTemperature,
    ];

    /// `(cluster, attribute)` on the wire.
    pub const fn ids(self) -> (u16, u16) {
        match self {
            Self::OnOff => (CLUSTER_ON_OFF, 0x0000),
            Self::SystemMode => (CLUSTER_THERMOSTAT, 0x001C),
            Self::LocalTemperature => (CLUSTER_THERMOSTAT, 0x0000),
            Self::HeatingSetpoint => (CLUSTER_THERMOSTAT, 0x0012),
            Self::MeasuredTemperature => (CLUSTER_TEMPERATURE_MEASUREMENT, 0x0000),
        }
    }

    pub fn from_ids(cluster: u16, attribute: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.ids() == (cluster, attribute))
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::OnOff => "on_off",
            Self::SystemMode => "system_mode",
            Self::LocalTemperature => "local_temperature",
            Self::HeatingSetpoint => "heating_setpoint",
            Self::MeasuredTemperature => "measured_temperature",
        }
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (cluster, attr) = self.ids();
        write!(f, "{} ({cluster:#06x}/{attr:#06x})", self.name())
    }
}

/// Wire value of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    Bool(bool),
    Enum8(u8),
    I16(i16),
}

/// Thermostat system mode.  Only the two values the kettle can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum SystemMode {
    Off = 0x00,
    Heat = 0x04,
}

impl SystemMode {
    pub const fn from_heating(heating: bool) -> Self {
        if heating { Self::Heat } else { Self::Off }
    }
}

/// A setpoint outside [`Temperature::SETPOINT_RANGE`] was offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange(pub Temperature);

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "setpoint {} outside 50.00–100.00 °C", self.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Store
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeStore {
    on_off: bool,
    system_mode: SystemMode,
    local_temperature: Temperature,
    measured_temperature: Temperature,
    heating_setpoint: Temperature,
}

impl AttributeStore {
    /// Temperatures start as INVALID until the first good sample.
    /// An out-of-range `setpoint` is clamped into range.
    pub fn new(heating: bool, setpoint: Temperature) -> Self {
        let setpoint = match setpoint.get() {
            Some(c) => Temperature::from_centi(Temperature::SETPOINT_RANGE.clamp(i32::from(c))),
            None => Temperature::from_centi(Temperature::SETPOINT_RANGE.max),
        };
        Self {
            on_off: heating,
            system_mode: SystemMode::from_heating(heating),
            local_temperature: Temperature::INVALID,
            measured_temperature: Temperature::INVALID,
            heating_setpoint: setpoint,
        }
    }

    pub fn on_off(&self) -> bool {
        self.on_off
    }

    pub fn system_mode(&self) -> SystemMode {
        self.system_mode
    }

    pub fn local_temperature(&self) -> Temperature {
        self.local_temperature
    }

    pub fn measured_temperature(&self) -> Temperature {
        self.measured_temperature
    }

    pub fn heating_setpoint(&self) -> Temperature {
        self.heating_setpoint
    }

    /// `on_off` and `system_mode` always move together.
    pub fn set_heating(&mut self, heating: bool) {
        self.on_off = heating;
        self.system_mode = SystemMode::from_heating(heating);
    }

    /// Writes both the thermostat and the measurement cluster value.
    /// Valid readings are clamped into [`Temperature::MEASURED_RANGE`].
    pub fn set_water_temperature(&mut self, t: Temperature) {
        let t = match t.get() {
            Some(c) => Temperature::from_centi(Temperature::MEASURED_RANGE.clamp(i32::from(c))),
            None => Temperature::INVALID,
        };
        self.local_temperature = t;
        self.measured_temperature = t;
    }

    pub fn set_heating_setpoint(&mut self, t: Temperature) -> Result<(), OutOfRange> {
        match t.get() {
            Some(c) if Temperature::SETPOINT_RANGE.contains(c) => {
                self.heating_setpoint = t;
                Ok(())
            }
            _ => Err(OutOfRange(t)),
        }
    }

    pub fn value(&self, attr: AttributeId) -> AttributeValue {
        match attr {
            AttributeId::OnOff => AttributeValue::Bool(self.on_off),
            AttributeId::SystemMode => AttributeValue::Enum8(self.system_mode as u8),
            AttributeId::LocalTemperature => AttributeValue::I16(self.local_temperature.centi()),
            AttributeId::HeatingSetpoint => AttributeValue::I16(self.heating_setpoint.centi()),
            AttributeId::MeasuredTemperature => {
                AttributeValue::I16(self.measured_temperature.centi())
            }
        }
    }
}
