//! Concrete state handler functions and table builder.
//!
//! Each state is three plain `fn` pointers: what to do when the heating
//! line is observed, when a remote on/off request arrives, and when a
//! transition timeout fires.
//!
//! ```text
//!   OFF ──[request on]──▶ TURNING_ON ──[line high]──▶ ON
//!    ▲ ◀───[timeout: declined]───┘                    │
//!    │                                          [request off]
//!    │                                                ▼
//!    └────────[line low]──────────────────────── TURNING_OFF
//!                                                     │
//!   ON ◀──[timeout, line still high: declined]────────┘
//!
//!   Outside a transition the line is followed directly:
//!   OFF ──[line high]──▶ ON ──[line low]──▶ OFF
//! ```

use super::context::FsmContext;
use super::{KettleState, StateDescriptor};
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; KettleState::COUNT] {
    [
        // Index 0: Off
        StateDescriptor {
            id: KettleState::Off,
            name: "OFF",
            on_level: off_level,
            on_request: off_request,
            on_timeout: ignore_timeout,
        },
        // Index 1: TurningOn
        StateDescriptor {
            id: KettleState::TurningOn,
            name: "TURNING_ON",
            on_level: turning_on_level,
            on_request: turning_on_request,
            on_timeout: turning_on_timeout,
        },
        // Index 2: On
        StateDescriptor {
            id: KettleState::On,
            name: "ON",
            on_level: on_level,
            on_request: on_request,
            on_timeout: ignore_timeout,
        },
        // Index 3: TurningOff
        StateDescriptor {
            id: KettleState::TurningOff,
            name: "TURNING_OFF",
            on_level: turning_off_level,
            on_request: turning_off_request,
            on_timeout: turning_off_timeout,
        },
    ]
}

fn ignore_timeout(ctx: &mut FsmContext, token: u32) -> Option<KettleState> {
    debug!("timeout {token} with nothing pending ({:?})", ctx.pending);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF: not heating, idle
// ═══════════════════════════════════════════════════════════════════════════

fn off_level(ctx: &mut FsmContext, heating: bool) -> Option<KettleState> {
    if heating {
        // Someone pressed the kettle's own button.
        ctx.report(true);
        return Some(KettleState::On);
    }
    None
}

fn off_request(ctx: &mut FsmContext, on: bool) -> Option<KettleState> {
    if !on {
        info!("kettle already off");
        return None;
    }
    ctx.begin_transition(KettleState::On);
    Some(KettleState::TurningOn)
}

// ═══════════════════════════════════════════════════════════════════════════
//  TURNING_ON: pulse sent, waiting for the heating line
// ═══════════════════════════════════════════════════════════════════════════

fn turning_on_level(ctx: &mut FsmContext, heating: bool) -> Option<KettleState> {
    if heating {
        ctx.finish_transition();
        ctx.report(true);
        return Some(KettleState::On);
    }
    None
}

fn turning_on_request(ctx: &mut FsmContext, on: bool) -> Option<KettleState> {
    if on {
        info!("kettle already turning on");
        return None;
    }
    ctx.begin_transition(KettleState::Off);
    Some(KettleState::TurningOff)
}

fn turning_on_timeout(ctx: &mut FsmContext, token: u32) -> Option<KettleState> {
    ctx.take_expired(token)?;
    warn!("kettle did not start heating, request declined");
    ctx.actions.declined = Some(KettleState::On);
    ctx.report(false);
    Some(KettleState::Off)
}

// ═══════════════════════════════════════════════════════════════════════════
//  ON: heating
// ═══════════════════════════════════════════════════════════════════════════

fn on_level(ctx: &mut FsmContext, heating: bool) -> Option<KettleState> {
    if !heating {
        // Boiled, lifted, or switched off by hand.
        ctx.report(false);
        return Some(KettleState::Off);
    }
    None
}

fn on_request(ctx: &mut FsmContext, on: bool) -> Option<KettleState> {
    if on {
        info!("kettle already on");
        return None;
    }
    ctx.begin_transition(KettleState::Off);
    Some(KettleState::TurningOff)
}

// ═══════════════════════════════════════════════════════════════════════════
//  TURNING_OFF: pulse sent, waiting for the heating line to drop
// ═══════════════════════════════════════════════════════════════════════════

fn turning_off_level(ctx: &mut FsmContext, heating: bool) -> Option<KettleState> {
    if !heating {
        ctx.finish_transition();
        ctx.report(false);
        return Some(KettleState::Off);
    }
    None
}

fn turning_off_request(ctx: &mut FsmContext, on: bool) -> Option<KettleState> {
    if !on {
        info!("kettle already turning off");
        return None;
    }
    ctx.begin_transition(KettleState::On);
    Some(KettleState::TurningOn)
}

fn turning_off_timeout(ctx: &mut FsmContext, token: u32) -> Option<KettleState> {
    ctx.take_expired(token)?;
    let heating = ctx.heating;
    ctx.report(heating);
    if heating {
        warn!("kettle kept heating, request declined");
        ctx.actions.declined = Some(KettleState::Off);
        Some(KettleState::On)
    } else {
        Some(KettleState::Off)
    }
}
