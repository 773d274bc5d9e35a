//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the blackboard state handlers read from and write to:
//! the last known level of the heating line, the pending transition and
//! the side effects requested by the handler that just ran.  Handlers never
//! touch hardware; the service drains [`FsmActions`] after each call and
//! applies them through its ports.

use super::KettleState;

// ---------------------------------------------------------------------------
// Pending transition
// ---------------------------------------------------------------------------

/// A pulse was sent and the heating line has not followed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    /// State the kettle should settle in once the line confirms.
    pub target: KettleState,
    /// Token of the timeout armed for this transition.
    pub token: u32,
}

// ---------------------------------------------------------------------------
// Side effects (written by handlers; consumed by the service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsmActions {
    /// Press the kettle's button once.
    pub pulse: bool,
    /// Arm the transition timeout with this token.
    pub arm_timeout: Option<u32>,
    /// Drop the armed transition timeout.
    pub cancel_timeout: bool,
    /// Explicit state report: heating or not.  Always surfaced.
    pub report: Option<bool>,
    /// The kettle ignored the request that created the pending transition.
    pub declined: Option<KettleState>,
}

impl FsmActions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    /// Last observed level of the heating line.
    pub heating: bool,
    /// At most one transition in flight.
    pub pending: Option<PendingTransition>,
    /// Side effects requested by the current handler call.
    pub actions: FsmActions,
    next_token: u32,
}

impl FsmContext {
    pub fn new(heating: bool) -> Self {
        Self {
            heating,
            pending: None,
            actions: FsmActions::default(),
            next_token: 1,
        }
    }

    /// Pulse the button and start waiting for `target`.  A transition
    /// already in flight is superseded and its timeout becomes stale.
    pub fn begin_transition(&mut self, target: KettleState) {
        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1).max(1);
        self.pending = Some(PendingTransition { target, token });
        self.actions.pulse = true;
        self.actions.arm_timeout = Some(token);
    }

    /// The heating line confirmed the pending transition.
    pub fn finish_transition(&mut self) {
        if self.pending.take().is_some() {
            self.actions.cancel_timeout = true;
        }
    }

    /// Consume the pending transition if `token` belongs to it.
    pub fn take_expired(&mut self, token: u32) -> Option<PendingTransition> {
        match self.pending {
            Some(p) if p.token == token => self.pending.take(),
            _ => None,
        }
    }

    pub fn report(&mut self, heating: bool) {
        self.actions.report = Some(heating);
    }

    pub fn take_actions(&mut self) -> FsmActions {
        core::mem::take(&mut self.actions)
    }
}
