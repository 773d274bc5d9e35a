//! Pairing button press tracking.
//!
//! The line is polled by the service; this driver only classifies edges.
//! Holding the button for `long_press_ms` requests a network leave so the
//! device can be paired again.  Short presses are logged and ignored.
//!
//! ```text
//!   press ──▶ ArmLongPress ──(held long_press_ms)──▶ LongPress timer fires
//!     │                                                  │
//!   release ──▶ CancelLongPress              is_held()? ──▶ pairing
//! ```

use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Nothing,
    /// Start the long-press timer.
    ArmLongPress,
    /// Button let go before the timer fired.
    CancelLongPress,
}

pub struct PairingButton {
    pressed: bool,
    pressed_at_ms: u64,
    long_press_ms: u32,
}

impl PairingButton {
    pub fn new(long_press_ms: u32) -> Self {
        Self {
            pressed: false,
            pressed_at_ms: 0,
            long_press_ms,
        }
    }

    /// Feed a level change of the button line.
    pub fn on_edge(&mut self, pressed: bool, now_ms: u64) -> ButtonAction {
        match (self.pressed, pressed) {
            (false, true) => {
                self.pressed = true;
                self.pressed_at_ms = now_ms;
                info!("Pairing button pressed");
                ButtonAction::ArmLongPress
            }
            (true, false) => {
                self.pressed = false;
                let held = now_ms.saturating_sub(self.pressed_at_ms);
                if held < u64::from(self.long_press_ms) {
                    info!("Pairing button short press ({held} ms) - ignored");
                }
                ButtonAction::CancelLongPress
            }
            _ => ButtonAction::Nothing,
        }
    }

    /// Still held when the long-press timer fires.
    pub fn is_held(&self) -> bool {
        self.pressed
    }
}
