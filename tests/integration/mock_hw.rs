//! Recording mock adapters for integration tests.
//!
//! Every output-line write and protocol call is kept so tests can assert on
//! the full history without real GPIO, ADC or radio.

#![allow(dead_code)]

use std::collections::HashMap;

use kettlebridge::app::attributes::{AttributeId, AttributeValue};
use kettlebridge::app::events::AppEvent;
use kettlebridge::app::ports::{
    DigitalIoPort, EventSink, InputLine, OutputLine, ProtocolPort, SensorPort, StoragePort,
};
use kettlebridge::app::report::ReportingSpec;
use kettlebridge::error::{IoError, SensorError, StorageError};
use kettlebridge::sensors::Channel;

/// Raw 12-bit code that reads back as `mv` at the sensor with the default
/// scaling (3600 mV full scale, 1:2 divider).
pub fn raw_for_mv(mv: i32) -> u16 {
    ((mv / 2) * 4095 / 3600 + 1) as u16
}

// ── MockHw ────────────────────────────────────────────────────

pub struct MockHw {
    pub heating: bool,
    pub pairing: bool,
    /// `None` makes the channel fail with `AdcReadFailed`.
    pub dial_raw: Option<u16>,
    pub water_raw: Option<u16>,
    pub heating_fails: bool,
    pub pairing_missing: bool,
    pub missing_outputs: Vec<OutputLine>,
    pub writes: Vec<(OutputLine, bool)>,
}

impl MockHw {
    /// Kettle idle on its base: dial at 80 °C, water at 50 °C.
    pub fn new() -> Self {
        Self {
            heating: false,
            pairing: false,
            dial_raw: Some(raw_for_mv(2600)),
            water_raw: Some(raw_for_mv(1900)),
            heating_fails: false,
            pairing_missing: false,
            missing_outputs: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Rising edges on the kettle button line.
    pub fn kettle_presses(&self) -> usize {
        self.writes
            .iter()
            .filter(|w| **w == (OutputLine::KettleButton, true))
            .count()
    }

    pub fn level(&self, line: OutputLine) -> Option<bool> {
        self.writes
            .iter()
            .rev()
            .find(|(l, _)| *l == line)
            .map(|(_, level)| *level)
    }

    pub fn led_writes(&self) -> usize {
        self.writes
            .iter()
            .filter(|(l, _)| *l == OutputLine::StatusLed)
            .count()
    }
}

impl Default for MockHw {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHw {
    fn read_raw(&mut self, channel: Channel) -> Result<u16, SensorError> {
        let raw = match channel {
            Channel::TargetDial => self.dial_raw,
            Channel::WaterTemperature => self.water_raw,
        };
        raw.ok_or(SensorError::AdcReadFailed)
    }
}

impl DigitalIoPort for MockHw {
    fn read_level(&mut self, line: InputLine) -> Result<bool, IoError> {
        match line {
            InputLine::HeatingState if self.heating_fails => Err(IoError::ReadFailed),
            InputLine::HeatingState => Ok(self.heating),
            InputLine::PairingButton if self.pairing_missing => Err(IoError::LineUnavailable),
            InputLine::PairingButton => Ok(self.pairing),
        }
    }

    fn set_level(&mut self, line: OutputLine, high: bool) -> Result<(), IoError> {
        if self.missing_outputs.contains(&line) {
            return Err(IoError::LineUnavailable);
        }
        self.writes.push((line, high));
        Ok(())
    }
}

// ── MockProtocol ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolCall {
    Publish(AttributeId, AttributeValue),
    Immediate(AttributeId, AttributeValue),
    Configure(ReportingSpec),
    Leave,
}

#[derive(Default)]
pub struct MockProtocol {
    pub calls: Vec<ProtocolCall>,
}

impl MockProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn immediate(&self, attr: AttributeId) -> Vec<AttributeValue> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ProtocolCall::Immediate(a, v) if *a == attr => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn published(&self, attr: AttributeId) -> Vec<AttributeValue> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ProtocolCall::Publish(a, v) if *a == attr => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn configured(&self) -> Vec<ReportingSpec> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ProtocolCall::Configure(spec) => Some(*spec),
                _ => None,
            })
            .collect()
    }

    pub fn leaves(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == ProtocolCall::Leave)
            .count()
    }
}

impl ProtocolPort for MockProtocol {
    fn publish(&mut self, attr: AttributeId, value: AttributeValue) {
        self.calls.push(ProtocolCall::Publish(attr, value));
    }

    fn send_immediate(&mut self, attr: AttributeId, value: AttributeValue) {
        self.calls.push(ProtocolCall::Immediate(attr, value));
    }

    fn configure_reporting(&mut self, spec: &ReportingSpec) {
        self.calls.push(ProtocolCall::Configure(*spec));
    }

    fn leave_network(&mut self) {
        self.calls.push(ProtocolCall::Leave);
    }
}

// ── MockStorage ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockStorage {
    pub store: HashMap<String, Vec<u8>>,
    pub fail_io: bool,
    pub saves: usize,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_setpoint(centi: i16) -> Self {
        let mut s = Self::new();
        s.store
            .insert("kettle/target_temp".into(), centi.to_le_bytes().to_vec());
        s
    }

    pub fn setpoint(&self) -> Option<i16> {
        let bytes = self.store.get("kettle/target_temp")?;
        Some(i16::from_le_bytes([bytes[0], bytes[1]]))
    }
}

impl StoragePort for MockStorage {
    fn load(&mut self, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        if self.fail_io {
            return Err(StorageError::IoError);
        }
        match self.store.get(key) {
            Some(v) if v.len() > buf.len() => Err(StorageError::Corrupted),
            Some(v) => {
                buf[..v.len()].copy_from_slice(v);
                Ok(v.len())
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        if self.fail_io {
            return Err(StorageError::IoError);
        }
        self.saves += 1;
        self.store.insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.store.remove(key);
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
