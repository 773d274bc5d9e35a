//! Service plus mocks on a virtual clock.

#![allow(dead_code)]

use kettlebridge::app::attributes::{AttributeId, AttributeValue};
use kettlebridge::app::commands::CommandStatus;
use kettlebridge::app::service::KettleService;
use kettlebridge::config::KettleConfig;
use kettlebridge::events::Event;

use crate::mock_hw::{MockHw, MockProtocol, MockStorage, RecordingSink};

/// Loop period of the real firmware.
pub const TICK_MS: u64 = 50;

pub struct Rig {
    pub service: KettleService,
    pub hw: MockHw,
    pub protocol: MockProtocol,
    pub storage: MockStorage,
    pub sink: RecordingSink,
    pub now: u64,
}

impl Rig {
    pub fn new() -> Self {
        Self::with(MockHw::new(), MockStorage::new())
    }

    pub fn with(hw: MockHw, storage: MockStorage) -> Self {
        Self {
            service: KettleService::new(KettleConfig::default()),
            hw,
            protocol: MockProtocol::new(),
            storage,
            sink: RecordingSink::new(),
            now: 0,
        }
    }

    /// Start and run the first pass (initial sample).
    pub fn started() -> Self {
        let mut rig = Self::new();
        rig.start();
        rig
    }

    pub fn start(&mut self) {
        self.service
            .start(
                self.now,
                &mut self.hw,
                &mut self.protocol,
                &mut self.storage,
                &mut self.sink,
            )
            .expect("start");
        self.poll();
    }

    pub fn poll(&mut self) {
        self.service.poll(
            self.now,
            &mut self.hw,
            &mut self.protocol,
            &mut self.storage,
            &mut self.sink,
        );
    }

    /// Run the loop every [`TICK_MS`] for `ms`.
    pub fn advance(&mut self, ms: u64) {
        let end = self.now + ms;
        while self.now < end {
            self.now = (self.now + TICK_MS).min(end);
            self.poll();
        }
    }

    pub fn join(&mut self) {
        self.service.push(Event::Network { joined: true });
        self.poll();
    }

    pub fn command(&mut self, attr: AttributeId, value: AttributeValue) -> CommandStatus {
        self.service.submit_command(attr, value)
    }

    /// Remote on/off followed by one pass.
    pub fn request(&mut self, on: bool) {
        assert_eq!(
            self.command(AttributeId::OnOff, AttributeValue::Bool(on)),
            CommandStatus::Accepted
        );
        self.poll();
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.protocol.clear();
        self.sink.events.clear();
        self.hw.writes.clear();
    }

    pub fn on_off_reports(&self) -> Vec<AttributeValue> {
        self.protocol.immediate(AttributeId::OnOff)
    }
}
