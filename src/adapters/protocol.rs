//! Log-only protocol adapter.
//!
//! Stands in for the wireless stack: keeps the attribute table the stack
//! would hold and writes every outbound report and reporting setup as one
//! JSON line to the log.  The join state it would announce is handed back
//! to the main loop through [`LogProtocol::take_network_change`].

use log::{info, warn};
use serde::Serialize;

use crate::app::attributes::{AttributeId, AttributeValue};
use crate::app::ports::ProtocolPort;
use crate::app::report::ReportingSpec;

#[derive(Serialize)]
struct ReportLine {
    kind: &'static str,
    cluster: u16,
    attribute: u16,
    name: &'static str,
    value: AttributeValue,
}

pub struct LogProtocol {
    table: [Option<AttributeValue>; AttributeId::COUNT],
    pending_network: Option<bool>,
    immediate_reports: u32,
}

impl LogProtocol {
    pub fn new() -> Self {
        Self {
            table: [None; AttributeId::COUNT],
            pending_network: None,
            immediate_reports: 0,
        }
    }

    /// Pretend to join.  There is no radio, so the join completes at once.
    pub fn start(&mut self) {
        info!("PROTO | stand-in stack started");
        self.pending_network = Some(true);
    }

    /// Join state change to forward to the service as `Event::Network`.
    pub fn take_network_change(&mut self) -> Option<bool> {
        self.pending_network.take()
    }

    /// Last value handed over for `attr`.
    pub fn value(&self, attr: AttributeId) -> Option<AttributeValue> {
        self.table[attr as usize]
    }

    pub fn immediate_reports(&self) -> u32 {
        self.immediate_reports
    }

    fn record(&mut self, kind: &'static str, attr: AttributeId, value: AttributeValue) {
        self.table[attr as usize] = Some(value);
        let (cluster, attribute) = attr.ids();
        let line = ReportLine {
            kind,
            cluster,
            attribute,
            name: attr.name(),
            value,
        };
        match serde_json::to_string(&line) {
            Ok(json) => info!("PROTO | {json}"),
            Err(e) => warn!("PROTO | {attr} not rendered: {e}"),
        }
    }
}

impl Default for LogProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolPort for LogProtocol {
    fn publish(&mut self, attr: AttributeId, value: AttributeValue) {
        self.record("publish", attr, value);
    }

    fn send_immediate(&mut self, attr: AttributeId, value: AttributeValue) {
        self.immediate_reports += 1;
        self.record("report", attr, value);
    }

    fn configure_reporting(&mut self, spec: &ReportingSpec) {
        match serde_json::to_string(spec) {
            Ok(json) => info!("PROTO | reporting {json}"),
            Err(e) => warn!("PROTO | reporting for {} not rendered: {e}", spec.attribute),
        }
    }

    fn leave_network(&mut self) {
        info!("PROTO | leaving network");
        self.pending_network = Some(false);
    }
}
