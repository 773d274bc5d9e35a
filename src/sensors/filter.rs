//! Integer exponential moving average, one per ADC channel.

/// `filtered += (raw - filtered) / k`, truncating.
///
/// The first sample after construction or [`reset`](Self::reset) is taken
/// as-is so a freshly seated kettle does not ramp up from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialFilter {
    k: i32,
    filtered: Option<i32>,
}

impl ExponentialFilter {
    pub fn new(k: i32) -> Self {
        Self {
            k: k.max(1),
            filtered: None,
        }
    }

    pub fn update(&mut self, raw: i32) -> i32 {
        let next = match self.filtered {
            None => raw,
            Some(f) => f + (raw - f) / self.k,
        };
        self.filtered = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.filtered = None;
    }

    pub fn value(&self) -> Option<i32> {
        self.filtered
    }
}
