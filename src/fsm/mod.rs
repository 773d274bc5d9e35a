//! Function-pointer finite state machine for the kettle's power state.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌─────────────┬─────────────┬──────────────┬──────────────┐ │
//! │  │ KettleState │ on_level    │ on_request   │ on_timeout   │ │
//! │  ├─────────────┼─────────────┼──────────────┼──────────────┤ │
//! │  │ Off         │ fn(ctx,bool)│ fn(ctx,bool) │ fn(ctx,u32)  │ │
//! │  │ TurningOn   │ fn(ctx,bool)│ fn(ctx,bool) │ fn(ctx,u32)  │ │
//! │  │ On          │ fn(ctx,bool)│ fn(ctx,bool) │ fn(ctx,u32)  │ │
//! │  │ TurningOff  │ fn(ctx,bool)│ fn(ctx,bool) │ fn(ctx,u32)  │ │
//! │  └─────────────┴─────────────┴──────────────┴──────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The kettle has no control input besides its own button, so a request
//! only ever produces a pulse plus a timeout.  Whether the kettle complied
//! is inferred from the heating line.  Every input is dispatched to the
//! current state's handler; a `Some(next)` return moves the engine.  The
//! handler's side effects are returned to the caller as [`FsmActions`].

pub mod context;
pub mod states;

use context::{FsmActions, FsmContext, PendingTransition};
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KettleState {
    Off = 0,
    TurningOn = 1,
    On = 2,
    TurningOff = 3,
}

impl KettleState {
    pub const COUNT: usize = 4;

    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Off,
            1 => Self::TurningOn,
            2 => Self::On,
            3 => Self::TurningOff,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Off
            }
        }
    }

    /// Resting state matching a level of the heating line.
    pub const fn from_heating(heating: bool) -> Self {
        if heating { Self::On } else { Self::Off }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Heating line observed at `bool`.
pub type LevelFn = fn(&mut FsmContext, bool) -> Option<KettleState>;

/// Remote request: `true` = on.
pub type RequestFn = fn(&mut FsmContext, bool) -> Option<KettleState>;

/// Transition timeout fired with this token.
pub type TimeoutFn = fn(&mut FsmContext, u32) -> Option<KettleState>;

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: KettleState,
    pub name: &'static str,
    pub on_level: LevelFn,
    pub on_request: RequestFn,
    pub on_timeout: TimeoutFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    table: [StateDescriptor; KettleState::COUNT],
    current: usize,
    ctx: FsmContext,
}

impl Fsm {
    /// Start in the resting state matching the heating line.  The initial
    /// state report is returned by [`start`](Self::start).
    pub fn new(heating: bool) -> Self {
        Self {
            table: states::build_state_table(),
            current: KettleState::from_heating(heating) as usize,
            ctx: FsmContext::new(heating),
        }
    }

    /// Initial report of the startup state.
    pub fn start(&mut self) -> FsmActions {
        info!("FSM starting in state: {}", self.table[self.current].name);
        let heating = self.ctx.heating;
        self.ctx.report(heating);
        self.ctx.take_actions()
    }

    pub fn state(&self) -> KettleState {
        KettleState::from_index(self.current)
    }

    pub fn state_name(&self) -> &'static str {
        self.table[self.current].name
    }

    pub fn pending(&self) -> Option<PendingTransition> {
        self.ctx.pending
    }

    pub fn heating(&self) -> bool {
        self.ctx.heating
    }

    /// The heating line was sampled (edge or re-read).
    pub fn on_level(&mut self, heating: bool) -> FsmActions {
        self.ctx.heating = heating;
        let next = (self.table[self.current].on_level)(&mut self.ctx, heating);
        self.finish(next)
    }

    /// Remote on/off request.
    pub fn request(&mut self, on: bool) -> FsmActions {
        let next = (self.table[self.current].on_request)(&mut self.ctx, on);
        self.finish(next)
    }

    /// Transition timeout fired.  Stale tokens are ignored.
    pub fn on_timeout(&mut self, token: u32) -> FsmActions {
        let next = (self.table[self.current].on_timeout)(&mut self.ctx, token);
        self.finish(next)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn finish(&mut self, next: Option<KettleState>) -> FsmActions {
        if let Some(next_id) = next {
            self.transition(next_id);
        }
        self.ctx.take_actions()
    }

    fn transition(&mut self, next_id: KettleState) {
        let next_idx = next_id as usize;
        if next_idx == self.current {
            return;
        }
        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );
        self.current = next_idx;
    }
}
