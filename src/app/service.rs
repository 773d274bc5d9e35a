//! Application service: the hexagonal core.
//!
//! [`KettleService`] owns the state machine, sensor pipeline, attribute
//! store, report gate, event queue and timers.  It exposes a
//! hardware-agnostic API; all I/O flows through port traits injected at
//! call sites, so the whole service runs under test with mock adapters and
//! a virtual clock.
//!
//! ```text
//!  SensorPort ────▶ ┌──────────────────────────────┐ ──▶ ProtocolPort
//!  DigitalIoPort ◀─▶│         KettleService        │ ──▶ EventSink
//!  submit_command ─▶│ FSM · Pipeline · ReportGate  │ ◀─▶ StoragePort
//!                   └──────────────────────────────┘
//! ```
//!
//! Each [`poll`](KettleService::poll):
//! 1. samples the heating line and pairing button, queueing edges,
//! 2. queues every expired timer,
//! 3. runs one processing pass over the queue in priority order.

use log::{debug, error, info, warn};

use crate::config::KettleConfig;
use crate::drivers::button::{ButtonAction, PairingButton};
use crate::drivers::status_led::{BURST_STEP_MS, StatusLed};
use crate::error::{Error, IoError, Result, StorageError};
use crate::events::{Event, EventQueue};
use crate::fsm::context::FsmActions;
use crate::fsm::{Fsm, KettleState};
use crate::scheduler::{Scheduler, TimerId};
use crate::sensors::temperature::Temperature;
use crate::sensors::{Channel, SensorPipeline, WaterReading};

use super::attributes::{AttributeId, AttributeStore, AttributeValue};
use super::commands::{CommandStatus, RemoteCommand};
use super::dispatcher::CommandDispatcher;
use super::events::AppEvent;
use super::ports::{
    DigitalIoPort, EventSink, InputLine, OutputLine, ProtocolPort, SensorPort, StoragePort,
};
use super::report::{Delivery, ReportGate};

/// Storage key of the persisted heating setpoint (2 bytes, little-endian).
pub const SETPOINT_KEY: &str = "kettle/target_temp";

// ───────────────────────────────────────────────────────────────
// KettleService
// ───────────────────────────────────────────────────────────────

pub struct KettleService {
    config: KettleConfig,
    fsm: Fsm,
    store: AttributeStore,
    gate: ReportGate,
    pipeline: SensorPipeline,
    queue: EventQueue,
    scheduler: Scheduler,
    button: PairingButton,
    led: StatusLed,
    joined: bool,
    started: bool,

    // -- Input polling --
    last_heating: Option<bool>,
    last_button: Option<bool>,
    heating_read_failing: bool,

    // -- Degraded features --
    kettle_button_available: bool,
    led_available: bool,
    pairing_available: bool,
}

impl KettleService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch hardware: call [`start`](Self::start) next.
    pub fn new(config: KettleConfig) -> Self {
        let setpoint = Temperature::from_centi(config.default_setpoint);
        let store = AttributeStore::new(false, setpoint);
        let gate = ReportGate::new(&store, &config);
        Self {
            fsm: Fsm::new(false),
            gate,
            store,
            pipeline: SensorPipeline::new(&config),
            queue: EventQueue::new(),
            scheduler: Scheduler::new(),
            button: PairingButton::new(config.long_press_ms),
            led: StatusLed::new(),
            joined: false,
            started: false,
            last_heating: None,
            last_button: None,
            heating_read_failing: false,
            kettle_button_available: true,
            led_available: true,
            pairing_available: true,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Read the heating line, restore the setpoint, report the initial
    /// state and arm the periodic timers.
    ///
    /// Fails only if the heating line cannot be read; every other
    /// peripheral degrades with a warning.
    pub fn start(
        &mut self,
        now_ms: u64,
        hw: &mut impl DigitalIoPort,
        protocol: &mut impl ProtocolPort,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let heating = hw.read_level(InputLine::HeatingState).map_err(|e| {
            error!("kettle state GPIO unreadable: {e}");
            Error::Init("kettle state GPIO")
        })?;
        self.last_heating = Some(heating);

        let setpoint = self.restore_setpoint(storage);
        self.store = AttributeStore::new(heating, setpoint);
        self.gate = ReportGate::new(&self.store, &self.config);

        // Seed the protocol's attribute table before any report goes out.
        for attr in [
            AttributeId::HeatingSetpoint,
            AttributeId::LocalTemperature,
            AttributeId::MeasuredTemperature,
        ] {
            protocol.publish(attr, self.store.value(attr));
        }

        match hw.set_level(OutputLine::KettleButton, false) {
            Ok(()) => {}
            Err(IoError::LineUnavailable) => {
                warn!("kettle button output unavailable, remote control disabled");
                self.kettle_button_available = false;
            }
            Err(e) => warn!("kettle button output: {e}"),
        }

        match hw.read_level(InputLine::PairingButton) {
            Ok(level) => self.last_button = Some(level),
            Err(IoError::LineUnavailable) => {
                warn!("pairing button unavailable, re-pairing disabled");
                self.pairing_available = false;
            }
            Err(e) => warn!("pairing button: {e}"),
        }

        match hw.set_level(OutputLine::StatusLed, false) {
            Ok(()) => {}
            Err(IoError::LineUnavailable) => {
                warn!("status LED unavailable");
                self.led_available = false;
            }
            Err(e) => warn!("status LED: {e}"),
        }

        self.fsm = Fsm::new(heating);
        let from = self.fsm.state();
        let actions = self.fsm.start();
        self.apply_fsm(from, actions, now_ms, hw, protocol, sink);

        self.scheduler.arm_every(
            TimerId::SensorSample,
            now_ms,
            0,
            self.config.sample_interval_ms,
        );
        self.scheduler
            .arm_every(TimerId::LedBlink, now_ms, 0, self.config.led_blink_ms);

        self.started = true;
        sink.emit(&AppEvent::Started(self.fsm.state()));
        info!(
            "KettleService started: {} setpoint {}",
            self.fsm.state_name(),
            self.store.heating_setpoint()
        );
        Ok(())
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Queue an event from an interrupt, the protocol stack or a test.
    pub fn push(&mut self, event: Event) -> bool {
        self.queue.push(event)
    }

    /// Attribute write from the protocol layer.  Supported writes are
    /// queued and run on the next pass; the status is returned now.
    pub fn submit_command(&mut self, attr: AttributeId, value: AttributeValue) -> CommandStatus {
        match CommandDispatcher::decode(attr, value) {
            Ok(cmd) => self.enqueue_command(cmd),
            Err(status) => status,
        }
    }

    /// Same as [`submit_command`](Self::submit_command), addressed by wire ids.
    pub fn submit_raw_command(
        &mut self,
        cluster: u16,
        attribute: u16,
        value: AttributeValue,
    ) -> CommandStatus {
        match CommandDispatcher::decode_raw(cluster, attribute, value) {
            Ok(cmd) => self.enqueue_command(cmd),
            Err(status) => status,
        }
    }

    fn enqueue_command(&mut self, cmd: RemoteCommand) -> CommandStatus {
        if self.queue.push_command(cmd) {
            CommandStatus::Accepted
        } else {
            CommandStatus::Busy
        }
    }

    // ── Per-poll orchestration ────────────────────────────────

    /// Run one loop iteration at `now_ms`.
    ///
    /// `hw` implements both [`SensorPort`] and [`DigitalIoPort`].
    pub fn poll(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + DigitalIoPort),
        protocol: &mut impl ProtocolPort,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        if !self.started {
            warn!("poll before start, ignored");
            return;
        }

        // 1. Low-priority input polling
        self.poll_inputs(hw);

        // 2. Expired timers
        for (timer, token) in self.scheduler.poll(now_ms) {
            let event = match timer {
                TimerId::SensorSample => Event::SensorTick,
                _ => Event::TimerFired { timer, token },
            };
            if !self.queue.push(event) && !self.scheduler.is_armed(timer) {
                // A one-shot is gone from its slot; fire it again next poll.
                self.scheduler.arm_once_with(timer, now_ms, 0, token);
            }
        }

        // 3. One processing pass
        for event in self.queue.take_pass() {
            self.handle_event(event, now_ms, hw, protocol, storage, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> KettleState {
        self.fsm.state()
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.store
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn config(&self) -> &KettleConfig {
        &self.config
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// How long the caller may sleep between polls.
    pub fn poll_interval_ms(&self) -> u32 {
        self.config.input_poll_interval_ms
    }

    // ── Internal: inputs ──────────────────────────────────────

    fn poll_inputs(&mut self, hw: &mut impl DigitalIoPort) {
        match hw.read_level(InputLine::HeatingState) {
            Ok(level) => {
                self.heating_read_failing = false;
                // Only commit the level once the edge is queued, so a
                // dropped edge is seen again on the next poll.
                if self.last_heating != Some(level)
                    && self.queue.push(Event::KettleGpio { heating: level })
                {
                    debug!("kettle GPIO: {:?} -> {level}", self.last_heating);
                    self.last_heating = Some(level);
                }
            }
            Err(e) => {
                if !self.heating_read_failing {
                    warn!("kettle state GPIO read failed: {e}");
                    self.heating_read_failing = true;
                }
            }
        }

        if !self.pairing_available {
            return;
        }
        match hw.read_level(InputLine::PairingButton) {
            Ok(level) if self.last_button != Some(level) => {
                if self.queue.push(Event::PairingButton { pressed: level }) {
                    self.last_button = Some(level);
                }
            }
            Ok(_) => {}
            Err(e) => debug!("pairing button read failed: {e}"),
        }
    }

    // ── Internal: event handling ──────────────────────────────

    fn handle_event(
        &mut self,
        event: Event,
        now_ms: u64,
        hw: &mut (impl SensorPort + DigitalIoPort),
        protocol: &mut impl ProtocolPort,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        match event {
            Event::KettleGpio { heating } => {
                let from = self.fsm.state();
                let actions = self.fsm.on_level(heating);
                self.apply_fsm(from, actions, now_ms, hw, protocol, sink);
            }
            Event::PairingButton { pressed } => match self.button.on_edge(pressed, now_ms) {
                ButtonAction::ArmLongPress => {
                    self.scheduler
                        .arm_once(TimerId::LongPress, now_ms, self.config.long_press_ms);
                }
                ButtonAction::CancelLongPress => self.scheduler.cancel(TimerId::LongPress),
                ButtonAction::Nothing => {}
            },
            Event::Network { joined } => self.on_network(joined, now_ms, hw, protocol, sink),
            Event::Command(cmd) => self.execute(cmd, now_ms, hw, protocol, storage, sink),
            Event::SensorTick => self.sample(hw, protocol, storage, sink),
            Event::TimerFired { timer, token } => {
                self.on_timer(timer, token, now_ms, hw, protocol, sink);
            }
        }
    }

    fn on_network(
        &mut self,
        joined: bool,
        now_ms: u64,
        hw: &mut impl DigitalIoPort,
        protocol: &mut impl ProtocolPort,
        sink: &mut impl EventSink,
    ) {
        if joined == self.joined {
            return;
        }
        self.joined = joined;
        sink.emit(&AppEvent::NetworkChanged { joined });
        info!("network {}", if joined { "joined" } else { "left" });

        if joined {
            for spec in self.gate.reporting_specs() {
                protocol.configure_reporting(&spec);
            }
            self.scheduler.cancel(TimerId::LedBlink);
            if !self.led.in_burst() {
                let level = self.led.off();
                self.drive_led(hw, level);
            }
        } else {
            self.scheduler
                .arm_every(TimerId::LedBlink, now_ms, 0, self.config.led_blink_ms);
        }
    }

    fn execute(
        &mut self,
        cmd: RemoteCommand,
        now_ms: u64,
        hw: &mut impl DigitalIoPort,
        protocol: &mut impl ProtocolPort,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            RemoteCommand::SetHeating(on) => {
                info!("On/Off command: {}", if on { "ON" } else { "OFF" });
                let from = self.fsm.state();
                let actions = self.fsm.request(on);
                self.apply_fsm(from, actions, now_ms, hw, protocol, sink);
            }
            RemoteCommand::SetHeatingSetpoint(setpoint) => {
                if let Err(e) = self.store.set_heating_setpoint(setpoint) {
                    // Range was checked at decode time.
                    warn!("{e}");
                    return;
                }
                info!("Thermostat setpoint changed: {setpoint}");
                self.persist_setpoint(storage);
                self.offer(AttributeId::HeatingSetpoint, protocol);
                sink.emit(&AppEvent::SetpointChanged {
                    setpoint,
                    remote: true,
                });
            }
        }
    }

    fn sample(
        &mut self,
        hw: &mut impl SensorPort,
        protocol: &mut impl ProtocolPort,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        match hw.read_raw(Channel::TargetDial) {
            Ok(raw) => {
                if self.pipeline.process_target(raw, &mut self.store) {
                    let setpoint = self.store.heating_setpoint();
                    info!("Target temperature changed: {setpoint}");
                    self.persist_setpoint(storage);
                    self.offer(AttributeId::HeatingSetpoint, protocol);
                    sink.emit(&AppEvent::SetpointChanged {
                        setpoint,
                        remote: false,
                    });
                }
            }
            Err(e) => warn!("target dial sample skipped: {e}"),
        }

        match hw.read_raw(Channel::WaterTemperature) {
            Ok(raw) => {
                let reading = self.pipeline.process_water(raw, &mut self.store);
                if reading.changed() {
                    self.offer(AttributeId::LocalTemperature, protocol);
                    self.offer(AttributeId::MeasuredTemperature, protocol);
                }
                match reading {
                    WaterReading::Invalidated => {
                        info!("Kettle off base or sensor disconnected");
                        sink.emit(&AppEvent::OffBase);
                    }
                    WaterReading::Updated { previous, current } if !previous.is_valid() => {
                        info!("Water temperature available: {current}");
                        sink.emit(&AppEvent::SensorReconnected(current));
                    }
                    _ => {}
                }
            }
            Err(e) => warn!("water temperature sample skipped: {e}"),
        }
    }

    fn on_timer(
        &mut self,
        timer: TimerId,
        token: u32,
        now_ms: u64,
        hw: &mut impl DigitalIoPort,
        protocol: &mut impl ProtocolPort,
        sink: &mut impl EventSink,
    ) {
        match timer {
            TimerId::TransitionTimeout => {
                // The line may have moved since the last poll; let it win.
                match hw.read_level(InputLine::HeatingState) {
                    Ok(level) => {
                        self.last_heating = Some(level);
                        let from = self.fsm.state();
                        let actions = self.fsm.on_level(level);
                        self.apply_fsm(from, actions, now_ms, hw, protocol, sink);
                    }
                    Err(e) => warn!("kettle state GPIO re-read failed: {e}"),
                }
                let from = self.fsm.state();
                let actions = self.fsm.on_timeout(token);
                self.apply_fsm(from, actions, now_ms, hw, protocol, sink);
            }
            _ if !self.scheduler.is_live(timer, token) => {
                debug!("stale {timer:?} fire (token {token})");
            }
            TimerId::PulseRelease => {
                if let Err(e) = hw.set_level(OutputLine::KettleButton, false) {
                    warn!("kettle button release failed: {e}");
                }
            }
            TimerId::LongPress => {
                if !self.button.is_held() {
                    return;
                }
                info!("Long press - leaving network for re-pairing");
                sink.emit(&AppEvent::PairingRequested);
                let level = self.led.start_burst();
                self.drive_led(hw, level);
                self.scheduler
                    .arm_every(TimerId::LedBurst, now_ms, BURST_STEP_MS, BURST_STEP_MS);
            }
            TimerId::LedBurst => {
                if let Some(level) = self.led.burst_step() {
                    self.drive_led(hw, level);
                    return;
                }
                self.scheduler.cancel(TimerId::LedBurst);
                if self.joined {
                    let level = self.led.off();
                    self.drive_led(hw, level);
                    protocol.leave_network();
                }
            }
            TimerId::LedBlink => {
                if !self.led.in_burst() {
                    let level = self.led.toggle();
                    self.drive_led(hw, level);
                }
            }
            TimerId::SensorSample => {}
        }
    }

    // ── Internal: side effects ────────────────────────────────

    /// Translate FSM actions into port calls.
    fn apply_fsm(
        &mut self,
        from: KettleState,
        actions: FsmActions,
        now_ms: u64,
        hw: &mut impl DigitalIoPort,
        protocol: &mut impl ProtocolPort,
        sink: &mut impl EventSink,
    ) {
        if actions.pulse {
            let requested_on = self
                .fsm
                .pending()
                .is_some_and(|p| p.target == KettleState::On);
            if self.press_kettle_button(now_ms, hw) {
                sink.emit(&AppEvent::ButtonPulsed { requested_on });
            }
        }

        if actions.cancel_timeout {
            self.scheduler.cancel(TimerId::TransitionTimeout);
        }
        if let Some(token) = actions.arm_timeout {
            self.scheduler.arm_once_with(
                TimerId::TransitionTimeout,
                now_ms,
                self.config.transition_timeout_ms,
                token,
            );
        }

        if let Some(heating) = actions.report {
            self.store.set_heating(heating);
            for attr in [AttributeId::OnOff, AttributeId::SystemMode] {
                let value = self.store.value(attr);
                let delivery = self.gate.force(attr, value);
                Self::deliver(protocol, attr, value, delivery);
            }
        }

        if let Some(target) = actions.declined {
            sink.emit(&AppEvent::CommandDeclined {
                requested_on: target == KettleState::On,
            });
        }

        let to = self.fsm.state();
        if to != from {
            sink.emit(&AppEvent::StateChanged { from, to });
        }
    }

    /// `false` if no press reached the line.
    fn press_kettle_button(&mut self, now_ms: u64, hw: &mut impl DigitalIoPort) -> bool {
        if !self.kettle_button_available {
            warn!("kettle button unavailable, pulse skipped");
            return false;
        }
        info!("Simulating kettle button press");
        if let Err(e) = hw.set_level(OutputLine::KettleButton, true) {
            warn!("kettle button press failed: {e}");
            return false;
        }
        self.scheduler
            .arm_once(TimerId::PulseRelease, now_ms, self.config.button_pulse_ms);
        true
    }

    fn drive_led(&mut self, hw: &mut impl DigitalIoPort, level: bool) {
        if !self.led_available {
            return;
        }
        if let Err(e) = hw.set_level(OutputLine::StatusLed, level) {
            debug!("status LED: {e}");
        }
    }

    /// Offer the store's current value to the gate and deliver it if
    /// significant.
    fn offer(&mut self, attr: AttributeId, protocol: &mut impl ProtocolPort) {
        let value = self.store.value(attr);
        if let Some(delivery) = self.gate.offer(attr, value) {
            Self::deliver(protocol, attr, value, delivery);
        }
    }

    fn deliver(
        protocol: &mut impl ProtocolPort,
        attr: AttributeId,
        value: AttributeValue,
        delivery: Delivery,
    ) {
        match delivery {
            Delivery::Immediate => protocol.send_immediate(attr, value),
            Delivery::Background => protocol.publish(attr, value),
        }
    }

    // ── Internal: persistence ─────────────────────────────────

    fn restore_setpoint(&self, storage: &mut impl StoragePort) -> Temperature {
        let default = Temperature::from_centi(self.config.default_setpoint);
        let mut buf = [0u8; 2];
        match storage.load(SETPOINT_KEY, &mut buf) {
            Ok(2) => {
                let t = Temperature::from_le_bytes(buf);
                match t.get() {
                    Some(c) if Temperature::SETPOINT_RANGE.contains(c) => {
                        info!("Loaded target temperature: {t}");
                        t
                    }
                    _ => {
                        warn!("stored setpoint {} out of range, using default", t.centi());
                        default
                    }
                }
            }
            Ok(n) => {
                warn!("stored setpoint has {n} bytes, using default");
                default
            }
            Err(StorageError::NotFound) => {
                info!("No stored setpoint, using default {default}");
                default
            }
            Err(e) => {
                warn!("setpoint load failed: {e}, using default");
                default
            }
        }
    }

    fn persist_setpoint(&self, storage: &mut impl StoragePort) {
        let bytes = self.store.heating_setpoint().to_le_bytes();
        if let Err(e) = storage.save(SETPOINT_KEY, &bytes) {
            warn!("setpoint save failed: {e}");
        }
    }
}
