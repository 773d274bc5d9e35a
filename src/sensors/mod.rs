//! Sensor subsystem: calibration, filtering and the per-channel
//! [`SensorPipeline`].
//!
//! ```text
//!   target dial ──▶ EMA ──▶ TARGET_DIAL ──▶ |Δ| > 0.5 °C? ──▶ heating_setpoint
//!
//!   water probe ──▶ valid? ──▶ EMA ──▶ valid? ──▶ CURRENT_TEMPERATURE
//!                    │                  │              │
//!                    └──── no ──────────┴──▶ INVALID   └─▶ |Δ| > 0.5 °C? ──▶ local/measured
//! ```
//!
//! The pipeline writes straight into the [`AttributeStore`] and reports
//! what it changed; reporting and persistence are the service's job.

pub mod calibration;
pub mod filter;
pub mod temperature;

use log::debug;

use crate::app::attributes::AttributeStore;
use crate::config::KettleConfig;
use calibration::{AdcScaling, CURRENT_TEMPERATURE, CalibrationTable, TARGET_DIAL};
use filter::ExponentialFilter;
use temperature::Temperature;

/// ADC channels the firmware samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Front-panel setpoint dial.
    TargetDial,
    /// Water thermistor in the base.
    WaterTemperature,
}

/// Outcome of one water-temperature sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterReading {
    /// Within hysteresis of the stored value.
    Unchanged,
    /// Stored value replaced.  `previous` may be INVALID (sensor came back).
    Updated {
        previous: Temperature,
        current: Temperature,
    },
    /// Sensor just went away; both temperatures are now INVALID.
    Invalidated,
    /// Sensor still absent, nothing changed.
    StillInvalid,
}

impl WaterReading {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Updated { .. } | Self::Invalidated)
    }
}

pub struct SensorPipeline {
    target_filter: ExponentialFilter,
    water_filter: ExponentialFilter,
    target_table: CalibrationTable<'static>,
    water_table: CalibrationTable<'static>,
    scaling: AdcScaling,
    setpoint_hysteresis: i32,
    temperature_hysteresis: i32,
    off_base_mv: i32,
    raw_floor: i32,
}

impl SensorPipeline {
    pub fn new(config: &KettleConfig) -> Self {
        Self::with_tables(config, TARGET_DIAL, CURRENT_TEMPERATURE)
    }

    pub fn with_tables(
        config: &KettleConfig,
        target_table: CalibrationTable<'static>,
        water_table: CalibrationTable<'static>,
    ) -> Self {
        Self {
            target_filter: ExponentialFilter::new(config.filter_k),
            water_filter: ExponentialFilter::new(config.filter_k),
            target_table,
            water_table,
            scaling: config.adc,
            setpoint_hysteresis: i32::from(config.setpoint_hysteresis),
            temperature_hysteresis: i32::from(config.temperature_hysteresis),
            off_base_mv: config.off_base_mv,
            raw_floor: i32::from(config.raw_floor),
        }
    }

    /// Feed one dial sample.  Returns `true` if the setpoint moved.
    pub fn process_target(&mut self, raw: u16, store: &mut AttributeStore) -> bool {
        let filtered = self.target_filter.update(i32::from(raw));
        let mv = self.scaling.source_mv(filtered);
        let candidate = self.target_table.interpolate(mv);
        let candidate = Temperature::from_centi(Temperature::SETPOINT_RANGE.clamp(candidate));

        let current = store.heating_setpoint();
        if let Some(d) = current.distance(candidate) {
            if d <= self.setpoint_hysteresis {
                return false;
            }
        }

        debug!("dial: raw={raw} filtered={filtered} {mv} mV -> {candidate}");
        store.set_heating_setpoint(candidate).is_ok()
    }

    /// Feed one water-temperature sample.
    pub fn process_water(&mut self, raw: u16, store: &mut AttributeStore) -> WaterReading {
        let raw = i32::from(raw);
        if !self.reading_valid(raw) {
            return self.invalidate(store);
        }

        let filtered = self.water_filter.update(raw);
        if !self.reading_valid(filtered) {
            return self.invalidate(store);
        }

        let mv = self.scaling.source_mv(filtered);
        let candidate = self.water_table.convert(mv);
        if !candidate.is_valid() {
            return self.invalidate(store);
        }

        let previous = store.measured_temperature();
        let significant = previous
            .distance(candidate)
            .is_none_or(|d| d > self.temperature_hysteresis);
        if !significant {
            return WaterReading::Unchanged;
        }

        debug!("water: raw={raw} filtered={filtered} {mv} mV -> {candidate}");
        store.set_water_temperature(candidate);
        WaterReading::Updated {
            previous,
            current: store.measured_temperature(),
        }
    }

    /// Raw-count and off-base voltage checks.
    pub fn reading_valid(&self, raw: i32) -> bool {
        raw >= self.raw_floor && self.scaling.source_mv(raw) >= self.off_base_mv
    }

    fn invalidate(&mut self, store: &mut AttributeStore) -> WaterReading {
        self.water_filter.reset();
        if store.measured_temperature().is_valid() {
            store.set_water_temperature(Temperature::INVALID);
            WaterReading::Invalidated
        } else {
            WaterReading::StillInvalid
        }
    }
}
