//! Network status LED.
//!
//! | Condition              | LED                               |
//! |------------------------|-----------------------------------|
//! | searching for network  | toggles every `led_blink_ms`      |
//! | joined                 | off                               |
//! | long press acknowledged| 6 toggles, 100 ms apart           |
//!
//! The driver only tracks the logical level; the service drives the line
//! through [`DigitalIoPort`](crate::app::ports::DigitalIoPort) with the
//! levels returned here.

/// Toggles in the long-press acknowledgement burst.
pub const BURST_TOGGLES: u8 = 6;

/// Spacing of the burst toggles.
pub const BURST_STEP_MS: u32 = 100;

pub struct StatusLed {
    lit: bool,
    burst_left: u8,
}

impl StatusLed {
    pub fn new() -> Self {
        Self {
            lit: false,
            burst_left: 0,
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn in_burst(&self) -> bool {
        self.burst_left > 0
    }

    /// Next blink level.
    pub fn toggle(&mut self) -> bool {
        self.lit = !self.lit;
        self.lit
    }

    pub fn off(&mut self) -> bool {
        self.lit = false;
        self.lit
    }

    /// First toggle of the burst.  The rest come from
    /// [`burst_step`](Self::burst_step).
    pub fn start_burst(&mut self) -> bool {
        self.burst_left = BURST_TOGGLES - 1;
        self.toggle()
    }

    /// `Some(level)` while the burst runs, `None` once it is over.
    pub fn burst_step(&mut self) -> Option<bool> {
        if self.burst_left == 0 {
            return None;
        }
        self.burst_left -= 1;
        Some(self.toggle())
    }
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}
