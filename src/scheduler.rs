//! Virtual-time timer table.
//!
//! Every timer the firmware uses has a fixed [`TimerId`] slot.  Arming a
//! slot replaces whatever was there and tags it with a token; the token
//! travels with the fire event so a handler can tell a live fire from one
//! that was cancelled or re-armed after it was queued.
//!
//! ```text
//!   arm(id, now, ..) ──▶ slot[id] = { deadline, period, token }
//!                                        │
//!   poll(now) ──▶ deadline <= now ? ──▶ (id, token) ──▶ Event::TimerFired
//!                                        │
//!                    periodic: deadline += period   one-shot: slot cleared
//! ```
//!
//! Time is whatever millisecond counter the caller passes in, so tests can
//! drive it directly.

use heapless::Vec;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TimerId {
    /// Periodic ADC sampling.
    SensorSample = 0,
    /// Periodic status LED toggle while searching for a network.
    LedBlink = 1,
    /// One-shot: the kettle did not follow the pulse in time.
    TransitionTimeout = 2,
    /// One-shot: release the simulated button.
    PulseRelease = 3,
    /// One-shot: pairing button held long enough.
    LongPress = 4,
    /// Periodic LED toggle during the long-press acknowledgement burst.
    LedBurst = 5,
}

impl TimerId {
    pub const COUNT: usize = 6;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerSlot {
    deadline_ms: u64,
    period_ms: Option<u32>,
    token: u32,
}

pub struct Scheduler {
    slots: [Option<TimerSlot>; TimerId::COUNT],
    /// Token of a one-shot that fired and has not been re-armed since.
    fired: [Option<u32>; TimerId::COUNT],
    next_token: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            slots: [None; TimerId::COUNT],
            fired: [None; TimerId::COUNT],
            next_token: 1,
        }
    }

    /// Fresh token, never zero.
    pub fn allocate_token(&mut self) -> u32 {
        let t = self.next_token;
        self.next_token = self.next_token.wrapping_add(1).max(1);
        t
    }

    /// One-shot after `delay_ms`.  Returns the token of the fire.
    pub fn arm_once(&mut self, id: TimerId, now_ms: u64, delay_ms: u32) -> u32 {
        let token = self.allocate_token();
        self.arm_once_with(id, now_ms, delay_ms, token);
        token
    }

    /// One-shot with a caller-owned token (the state machine's transitions).
    pub fn arm_once_with(&mut self, id: TimerId, now_ms: u64, delay_ms: u32, token: u32) {
        debug!("timer {id:?}: once in {delay_ms} ms (token {token})");
        self.fired[id as usize] = None;
        self.slots[id as usize] = Some(TimerSlot {
            deadline_ms: now_ms + u64::from(delay_ms),
            period_ms: None,
            token,
        });
    }

    /// Periodic, first fire after `first_ms`, then every `period_ms`.
    pub fn arm_every(&mut self, id: TimerId, now_ms: u64, first_ms: u32, period_ms: u32) -> u32 {
        let token = self.allocate_token();
        debug!("timer {id:?}: every {period_ms} ms (token {token})");
        self.fired[id as usize] = None;
        self.slots[id as usize] = Some(TimerSlot {
            deadline_ms: now_ms + u64::from(first_ms),
            period_ms: Some(period_ms.max(1)),
            token,
        });
        token
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.fired[id as usize] = None;
        if self.slots[id as usize].take().is_some() {
            debug!("timer {id:?}: cancelled");
        }
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.slots[id as usize].is_some()
    }

    /// `true` if `token` belongs to the current arming of `id`.  A one-shot
    /// that already fired stays live until it is re-armed or cancelled.
    pub fn is_live(&self, id: TimerId, token: u32) -> bool {
        self.fired[id as usize] == Some(token)
            || self.slots[id as usize].is_some_and(|s| s.token == token)
    }

    /// Collect every timer due at `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> Vec<(TimerId, u32), { TimerId::COUNT }> {
        let mut due = Vec::new();
        for id in ALL_TIMERS {
            let idx = id as usize;
            let Some(slot) = self.slots[idx].as_mut() else {
                continue;
            };
            if slot.deadline_ms > now_ms {
                continue;
            }
            let token = slot.token;
            let period_ms = slot.period_ms;
            match period_ms {
                Some(period) => {
                    // Skip missed periods rather than bursting.
                    while slot.deadline_ms <= now_ms {
                        slot.deadline_ms += u64::from(period);
                    }
                }
                None => {
                    self.slots[idx] = None;
                    self.fired[idx] = Some(token);
                }
            }
            // One entry per slot, cannot overflow.
            let _ = due.push((id, token));
        }
        due
    }
}

const ALL_TIMERS: [TimerId; TimerId::COUNT] = [
    TimerId::SensorSample,
    TimerId::LedBlink,
    TimerId::TransitionTimeout,
    TimerId::PulseRelease,
    TimerId::LongPress,
    TimerId::LedBurst,
];

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
