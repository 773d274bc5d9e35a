//! Piecewise-linear calibration from ADC samples to centi-degrees.
//!
//! ```text
//!   raw (0..4095) ──▶ ADC mV ──▶ ×divider ──▶ table scan ──▶ centi-°C
//! ```
//!
//! Both kettle sensors are non-linear, so each carries a small lookup
//! table of `(millivolts, centi-degrees)` pairs, strictly increasing in
//! voltage.  Between two points the value is linearly interpolated with
//! truncating integer division.  Above the last point the last
//! temperature is held; below the first point the table either clamps or
//! extrapolates from its first segment down to a floor.

use serde::{Deserialize, Serialize};

use super::temperature::Temperature;

// ---------------------------------------------------------------------------
// ADC front end
// ---------------------------------------------------------------------------

/// Raw-to-millivolt scaling of the ADC plus the external resistor divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdcScaling {
    /// Input voltage at full scale (12 dB attenuation).
    pub full_scale_mv: i32,
    /// Highest raw code (12-bit).
    pub max_raw: i32,
    /// Divider between the sensor and the ADC pin.
    pub divider_ratio: i32,
}

impl AdcScaling {
    pub const DEFAULT: Self = Self {
        full_scale_mv: 3600,
        max_raw: 4095,
        divider_ratio: 2,
    };

    /// Voltage at the ADC pin.  Saturates rather than wrapping.
    pub fn adc_mv(&self, raw: i32) -> i32 {
        raw.saturating_mul(self.full_scale_mv) / self.max_raw.max(1)
    }

    /// Voltage at the sensor, before the divider.
    pub fn source_mv(&self, raw: i32) -> i32 {
        self.adc_mv(raw).saturating_mul(self.divider_ratio)
    }
}

impl Default for AdcScaling {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// Table types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationPoint {
    pub millivolts: i32,
    pub centi: i16,
}

impl CalibrationPoint {
    pub const fn new(millivolts: i32, centi: i16) -> Self {
        Self { millivolts, centi }
    }
}

/// What to do with voltages at or below the first table point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BelowRange {
    /// Hold the first point's temperature.
    Clamp,
    /// Continue the first segment's slope, never going below `floor`.
    Extrapolate { floor: i16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    TooFewPoints,
    NotIncreasing,
}

#[derive(Debug, Clone, Copy)]
pub struct CalibrationTable<'a> {
    points: &'a [CalibrationPoint],
    below: BelowRange,
}

impl CalibrationTable<'static> {
    /// Built-in tables are checked at compile time.
    pub const fn from_static(points: &'static [CalibrationPoint], below: BelowRange) -> Self {
        assert!(points.len() >= 2, "calibration table needs at least two points");
        let mut i = 1;
        while i < points.len() {
            assert!(
                points[i].millivolts > points[i - 1].millivolts,
                "calibration voltages must be strictly increasing"
            );
            i += 1;
        }
        Self { points, below }
    }
}

impl<'a> CalibrationTable<'a> {
    pub fn new(points: &'a [CalibrationPoint], below: BelowRange) -> Result<Self, CalibrationError> {
        if points.len() < 2 {
            return Err(CalibrationError::TooFewPoints);
        }
        if points.windows(2).any(|w| w[1].millivolts <= w[0].millivolts) {
            return Err(CalibrationError::NotIncreasing);
        }
        Ok(Self { points, below })
    }

    pub fn points(&self) -> &'a [CalibrationPoint] {
        self.points
    }

    /// Interpolate a sensor voltage into centi-degrees.
    pub fn interpolate(&self, mv: i32) -> i32 {
        let first = self.points[0];
        if mv <= first.millivolts {
            return match self.below {
                BelowRange::Clamp => i32::from(first.centi),
                BelowRange::Extrapolate { floor } => {
                    lerp(first, self.points[1], mv).max(i32::from(floor))
                }
            };
        }

        for w in self.points.windows(2) {
            if mv <= w[1].millivolts {
                return lerp(w[0], w[1], mv);
            }
        }

        i32::from(self.points[self.points.len() - 1].centi)
    }

    /// Interpolate and narrow to a [`Temperature`].
    pub fn convert(&self, mv: i32) -> Temperature {
        let centi = self.interpolate(mv).clamp(i32::from(i16::MIN) + 1, i32::from(i16::MAX));
        Temperature::from_centi(centi as i16)
    }
}

fn lerp(a: CalibrationPoint, b: CalibrationPoint, mv: i32) -> i32 {
    let (t0, t1) = (i32::from(a.centi), i32::from(b.centi));
    t0 + (t1 - t0) * (mv - a.millivolts) / (b.millivolts - a.millivolts)
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

const TARGET_DIAL_POINTS: [CalibrationPoint; 7] = [
    CalibrationPoint::new(0, 10000),
    CalibrationPoint::new(800, 9500),
    CalibrationPoint::new(1700, 9000),
    CalibrationPoint::new(2600, 8000),
    CalibrationPoint::new(3700, 7000),
    CalibrationPoint::new(4500, 6000),
    CalibrationPoint::new(5000, 5000),
];

const CURRENT_TEMPERATURE_POINTS: [CalibrationPoint; 5] = [
    CalibrationPoint::new(1200, 2500),
    CalibrationPoint::new(1900, 5000),
    CalibrationPoint::new(2200, 7000),
    CalibrationPoint::new(3000, 9000),
    CalibrationPoint::new(3300, 10000),
];

/// Front-panel dial: turning up lowers the voltage.  0 mV = 100 °C.
pub const TARGET_DIAL: CalibrationTable<'static> =
    CalibrationTable::from_static(&TARGET_DIAL_POINTS, BelowRange::Clamp);

/// Water thermistor in the kettle base.
pub const CURRENT_TEMPERATURE: CalibrationTable<'static> = CalibrationTable::from_static(
    &CURRENT_TEMPERATURE_POINTS,
    BelowRange::Extrapolate { floor: 0 },
);
