//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::ButtonPulsed { requested_on } => {
                info!("PULSE | toward {}", if *requested_on { "ON" } else { "OFF" });
            }
            AppEvent::CommandDeclined { requested_on } => {
                warn!(
                    "DECLINED | kettle ignored {} request",
                    if *requested_on { "ON" } else { "OFF" }
                );
            }
            AppEvent::OffBase => {
                info!("WATER | off base");
            }
            AppEvent::SensorReconnected(t) => {
                info!("WATER | back on base at {t}");
            }
            AppEvent::SetpointChanged { setpoint, remote } => {
                info!(
                    "SETPOINT | {setpoint} ({})",
                    if *remote { "remote" } else { "dial" }
                );
            }
            AppEvent::NetworkChanged { joined } => {
                info!("NET | {}", if *joined { "joined" } else { "left" });
            }
            AppEvent::PairingRequested => {
                info!("NET | pairing requested");
            }
        }
    }
}
