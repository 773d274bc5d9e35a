//! Typed event queue.
//!
//! Events are produced by:
//! - input polling (heating line, pairing button)
//! - the protocol stack (network join state, attribute writes)
//! - the [`Scheduler`](crate::scheduler::Scheduler) (sensor ticks, timeouts)
//!
//! and consumed by [`KettleService::poll`](crate::app::service::KettleService::poll)
//! one pass at a time.  A pass takes everything queued so far and handles it
//! in priority order, FIFO within a priority.  A confirming GPIO edge is
//! therefore always seen before a timeout that expired in the same poll.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ GPIO poll    │────▶│              │     │                  │
//! │ Protocol     │────▶│  EventQueue  │────▶│  processing pass │
//! │ Scheduler    │────▶│  (cap 32)    │     │  (sorted)        │
//! └──────────────┘     └──────────────┘     └──────────────────┘
//! ```

use heapless::{Deque, Vec};
use log::warn;

use crate::app::commands::RemoteCommand;
use crate::scheduler::TimerId;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 32;

/// Slots remote commands may never take.  One poll queues at most two
/// GPIO edges and one fire per timer, so these always fit.
pub const RESERVED_SLOTS: usize = 2 + TimerId::COUNT;

/// Pending remote commands allowed before new ones are refused.
pub const COMMAND_QUEUE_CAP: usize = EVENT_QUEUE_CAP - RESERVED_SLOTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Heating-state line changed level.
    KettleGpio { heating: bool },
    /// Pairing button changed level.
    PairingButton { pressed: bool },
    /// Joined or left the network.
    Network { joined: bool },
    /// Decoded attribute write.
    Command(RemoteCommand),
    /// Time to sample both ADC channels.
    SensorTick,
    /// A scheduler timer expired.
    TimerFired { timer: TimerId, token: u32 },
}

impl Event {
    /// Lower value is handled first within a pass.
    pub fn priority(&self) -> u8 {
        match self {
            Self::KettleGpio { .. } => 0,
            Self::PairingButton { .. } => 1,
            Self::Network { .. } => 2,
            Self::Command(_) => 3,
            Self::SensorTick => 4,
            Self::TimerFired { .. } => 5,
        }
    }
}

pub struct EventQueue {
    pending: Deque<Event, EVENT_QUEUE_CAP>,
    dropped: u32,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            pending: Deque::new(),
            dropped: 0,
        }
    }

    /// Enqueue an event.  Returns `false` (and logs) if the queue is full.
    pub fn push(&mut self, event: Event) -> bool {
        if self.pending.push_back(event).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            warn!("event queue full, dropped {event:?}");
            return false;
        }
        true
    }

    /// Enqueue a remote command, leaving [`RESERVED_SLOTS`] free for
    /// inputs and timers.  Returns `false` once [`COMMAND_QUEUE_CAP`] is
    /// reached.
    pub fn push_command(&mut self, command: RemoteCommand) -> bool {
        if self.pending.len() >= COMMAND_QUEUE_CAP {
            self.dropped = self.dropped.wrapping_add(1);
            warn!("command backlog full, refused {command:?}");
            return false;
        }
        self.push(Event::Command(command))
    }

    /// Take everything queued so far, sorted for one processing pass.
    pub fn take_pass(&mut self) -> Vec<Event, EVENT_QUEUE_CAP> {
        let mut pass: Vec<Event, EVENT_QUEUE_CAP> = Vec::new();
        while let Some(e) = self.pending.pop_front() {
            // Capacities match, cannot overflow.
            let _ = pass.push(e);
        }
        pass.sort_by_key(Event::priority);
        pass
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Events lost to overflow since startup.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
