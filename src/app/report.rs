//! Report throttling.
//!
//! The [`ReportGate`] remembers the last value surfaced for every attribute
//! and decides whether a new candidate is worth telling the network about.
//! Temperatures use a minimum delta, state attributes report on any change.
//! INVALID is always significant against a real reading and never against
//! another INVALID.
//!
//! ```text
//!   candidate ──▶ offer() ──▶ significant? ──no──▶ dropped
//!                                 │
//!                                yes ──▶ baseline = candidate
//!                                 │
//!                  on_off / system_mode ──▶ Immediate  (send now)
//!                  temperatures         ──▶ Background (reporting engine)
//! ```

use serde::Serialize;

use crate::config::KettleConfig;
use crate::sensors::temperature::Temperature;

use super::attributes::{AttributeId, AttributeStore, AttributeValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPolicy {
    /// Surface when the numeric distance exceeds the delta.
    Delta(i32),
    /// Surface on any change.
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Sent straight away (state attributes).
    Immediate,
    /// Marked for the protocol's periodic reporting.
    Background,
}

/// Background reporting parameters for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportingSpec {
    pub attribute: AttributeId,
    pub min_interval_s: u16,
    pub max_interval_s: u16,
    pub reportable_change: i32,
}

pub struct ReportGate {
    baselines: [AttributeValue; AttributeId::COUNT],
    temperature_delta: i32,
    setpoint_delta: i32,
}

impl ReportGate {
    /// Baselines start from whatever the store holds at startup.
    pub fn new(store: &AttributeStore, config: &KettleConfig) -> Self {
        Self {
            baselines: AttributeId::ALL.map(|a| store.value(a)),
            temperature_delta: config.temperature_report_delta,
            setpoint_delta: config.setpoint_report_delta,
        }
    }

    pub fn policy(&self, attr: AttributeId) -> ReportPolicy {
        match attr {
            AttributeId::OnOff | AttributeId::SystemMode => ReportPolicy::Exact,
            AttributeId::LocalTemperature | AttributeId::MeasuredTemperature => {
                ReportPolicy::Delta(self.temperature_delta)
            }
            AttributeId::HeatingSetpoint => ReportPolicy::Delta(self.setpoint_delta),
        }
    }

    pub fn delivery(attr: AttributeId) -> Delivery {
        match attr {
            AttributeId::OnOff | AttributeId::SystemMode => Delivery::Immediate,
            _ => Delivery::Background,
        }
    }

    pub fn baseline(&self, attr: AttributeId) -> AttributeValue {
        self.baselines[attr as usize]
    }

    /// Returns how to deliver `candidate`, or `None` if it is not
    /// significant against the baseline.
    pub fn offer(&mut self, attr: AttributeId, candidate: AttributeValue) -> Option<Delivery> {
        if !self.is_significant(attr, candidate) {
            return None;
        }
        self.baselines[attr as usize] = candidate;
        Some(Self::delivery(attr))
    }

    /// Surface unconditionally.  Used for explicit state reports, which may
    /// repeat the previous value.
    pub fn force(&mut self, attr: AttributeId, value: AttributeValue) -> Delivery {
        self.baselines[attr as usize] = value;
        Self::delivery(attr)
    }

    fn is_significant(&self, attr: AttributeId, candidate: AttributeValue) -> bool {
        let baseline = self.baseline(attr);
        match (self.policy(attr), baseline, candidate) {
            (ReportPolicy::Delta(delta), AttributeValue::I16(old), AttributeValue::I16(new)) => {
                let old = Temperature::from_centi(old);
                let new = Temperature::from_centi(new);
                match (old.is_valid(), new.is_valid()) {
                    (false, false) => false,
                    (true, true) => old.distance(new).is_some_and(|d| d > delta),
                    _ => true,
                }
            }
            _ => baseline != candidate,
        }
    }

    /// Parameters for the protocol's background reporting engine.
    pub fn reporting_specs(&self) -> [ReportingSpec; 3] {
        [
            ReportingSpec {
                attribute: AttributeId::LocalTemperature,
                min_interval_s: 5,
                max_interval_s: 300,
                reportable_change: self.temperature_delta,
            },
            ReportingSpec {
                attribute: AttributeId::MeasuredTemperature,
                min_interval_s: 5,
                max_interval_s: 300,
                reportable_change: self.temperature_delta,
            },
            ReportingSpec {
                attribute: AttributeId::HeatingSetpoint,
                min_interval_s: 10,
                max_interval_s: 3600,
                reportable_change: self.setpoint_delta,
            },
        ]
    }
}
