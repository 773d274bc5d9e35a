//! Centi-degree temperature value shared by the sensor pipeline, the
//! attribute store and the protocol boundary.
//!
//! Temperatures travel as signed 16-bit hundredths of a degree Celsius
//! (`2150` = 21.50 °C).  `0x8000` is the protocol's "no reading" sentinel
//! and is exposed here as [`Temperature::INVALID`].

use core::fmt;

use serde::{Deserialize, Serialize};

/// Signed 16-bit centi-degrees, or [`Temperature::INVALID`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Temperature(i16);

/// Inclusive range of valid centi-degree values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureRange {
    pub min: i16,
    pub max: i16,
}

impl TemperatureRange {
    pub fn contains(&self, centi: i16) -> bool {
        (self.min..=self.max).contains(&centi)
    }

    pub fn clamp(&self, centi: i32) -> i16 {
        centi.clamp(i32::from(self.min), i32::from(self.max)) as i16
    }
}

impl Temperature {
    /// Sensor disconnected, kettle lifted off its base, or nothing sampled yet.
    pub const INVALID: Self = Self(i16::MIN);

    /// Accepted heating setpoints: 50.00 °C to 100.00 °C.
    pub const SETPOINT_RANGE: TemperatureRange = TemperatureRange { min: 5000, max: 10000 };

    /// Values the water sensor may report: 0.00 °C to 100.00 °C.
    pub const MEASURED_RANGE: TemperatureRange = TemperatureRange { min: 0, max: 10000 };

    pub const fn from_centi(centi: i16) -> Self {
        Self(centi)
    }

    /// Raw wire value, including the sentinel.
    pub const fn centi(self) -> i16 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != i16::MIN
    }

    /// `None` for [`Temperature::INVALID`].
    pub const fn get(self) -> Option<i16> {
        if self.is_valid() { Some(self.0) } else { None }
    }

    /// Absolute distance between two valid readings.  `None` if either
    /// side is the sentinel.
    pub fn distance(self, other: Self) -> Option<i32> {
        match (self.get(), other.get()) {
            (Some(a), Some(b)) => Some((i32::from(a) - i32::from(b)).abs()),
            _ => None,
        }
    }

    /// Little-endian encoding used for the persisted setpoint.
    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self(i16::from_le_bytes(bytes))
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(c) => {
                let sign = if c < 0 { "-" } else { "" };
                let abs = i32::from(c).abs();
                write!(f, "{sign}{}.{:02} °C", abs / 100, abs % 100)
            }
            None => write!(f, "invalid"),
        }
    }
}
