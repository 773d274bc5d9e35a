//! System configuration parameters
//!
//! All tunable parameters for the kettle bridge.  The thresholds here were
//! chosen empirically on the bench; they are kept configurable rather than
//! baked into the algorithms.  Values can be overridden via NVS.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::sensors::calibration::AdcScaling;
use crate::sensors::temperature::Temperature;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KettleConfig {
    // --- Timing ---
    /// ADC sampling period (milliseconds)
    pub sample_interval_ms: u32,
    /// GPIO polling period of the low-priority input loop (milliseconds)
    pub input_poll_interval_ms: u32,
    /// How long to wait for the heating line to follow a pulse (milliseconds)
    pub transition_timeout_ms: u32,
    /// How long the simulated button is held closed (milliseconds)
    pub button_pulse_ms: u32,
    /// Pairing button hold time that triggers leave/rejoin (milliseconds)
    pub long_press_ms: u32,
    /// Status LED half-period while searching for a network (milliseconds)
    pub led_blink_ms: u32,

    // --- Filtering / hysteresis (centi-degrees) ---
    /// EMA smoothing divisor K
    pub filter_k: i32,
    /// Dial movement needed before the setpoint follows it
    pub setpoint_hysteresis: i16,
    /// Water temperature movement needed before the stored value follows it
    pub temperature_hysteresis: i16,

    // --- Sensor validity ---
    /// Pre-divider voltage below which the kettle is considered lifted (mV)
    pub off_base_mv: i32,
    /// Raw samples below this are treated as a disconnected sensor
    pub raw_floor: u16,

    // --- Reporting (centi-degrees) ---
    /// Minimum change of a temperature before it is surfaced
    pub temperature_report_delta: i32,
    /// Minimum change of the setpoint before it is surfaced
    pub setpoint_report_delta: i32,

    // --- Defaults ---
    /// Setpoint used until one is restored from storage
    pub default_setpoint: i16,

    // --- ADC front end ---
    pub adc: AdcScaling,
}

impl Default for KettleConfig {
    fn default() -> Self {
        Self {
            // Timing
            sample_interval_ms: 1000,
            input_poll_interval_ms: 50,
            transition_timeout_ms: 5000,
            button_pulse_ms: 200,
            long_press_ms: 3000,
            led_blink_ms: 500,

            // Filtering / hysteresis
            filter_k: 8,
            setpoint_hysteresis: 50,    // 0.5 °C
            temperature_hysteresis: 50, // 0.5 °C

            // Sensor validity
            off_base_mv: 1000,
            raw_floor: 10,

            // Reporting
            temperature_report_delta: 50, // 0.5 °C
            setpoint_report_delta: 100,   // 1.0 °C

            default_setpoint: 8000, // 80 °C

            adc: AdcScaling::DEFAULT,
        }
    }
}

impl KettleConfig {
    /// Range-check every field.  Called before persisting so a bad write
    /// from the network can never brick the sampling loop.
    pub fn validate(&self) -> Result<(), StorageError> {
        if !(100..=60_000).contains(&self.sample_interval_ms) {
            return Err(StorageError::ValidationFailed(
                "sample_interval_ms must be 100–60000",
            ));
        }
        if !(10..=1000).contains(&self.input_poll_interval_ms) {
            return Err(StorageError::ValidationFailed(
                "input_poll_interval_ms must be 10–1000",
            ));
        }
        if self.button_pulse_ms == 0 || self.button_pulse_ms >= self.transition_timeout_ms {
            return Err(StorageError::ValidationFailed(
                "button_pulse_ms must be non-zero and shorter than transition_timeout_ms",
            ));
        }
        if self.long_press_ms == 0 || self.led_blink_ms == 0 {
            return Err(StorageError::ValidationFailed(
                "long_press_ms and led_blink_ms must be non-zero",
            ));
        }
        if !(1..=64).contains(&self.filter_k) {
            return Err(StorageError::ValidationFailed("filter_k must be 1–64"));
        }
        if self.setpoint_hysteresis < 0 || self.temperature_hysteresis < 0 {
            return Err(StorageError::ValidationFailed(
                "hysteresis must not be negative",
            ));
        }
        if self.temperature_report_delta < 0 || self.setpoint_report_delta < 0 {
            return Err(StorageError::ValidationFailed(
                "report deltas must not be negative",
            ));
        }
        if !Temperature::SETPOINT_RANGE.contains(self.default_setpoint) {
            return Err(StorageError::ValidationFailed(
                "default_setpoint must be 5000–10000",
            ));
        }
        if !(1..=4095).contains(&self.adc.max_raw) {
            return Err(StorageError::ValidationFailed("adc.max_raw must be 1–4095"));
        }
        if !(1..=5000).contains(&self.adc.full_scale_mv) {
            return Err(StorageError::ValidationFailed(
                "adc.full_scale_mv must be 1–5000",
            ));
        }
        if !(1..=16).contains(&self.adc.divider_ratio) {
            return Err(StorageError::ValidationFailed(
                "adc.divider_ratio must be 1–16",
            ));
        }
        Ok(())
    }
}
