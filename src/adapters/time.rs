//! Monotonic clock for the main loop.
//!
//! - **`feature = "espidf"`**: wraps `esp_timer_get_time()` (microsecond
//!   precision, monotonic since boot).
//! - otherwise: `std::time::Instant` for host runs.

pub struct SystemClock {
    #[cfg(not(feature = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(feature = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot.
    #[cfg(feature = "espidf")]
    pub fn now_ms(&self) -> u64 {
        // SAFETY: esp_timer is started by the IDF before app_main.
        let us = unsafe { esp_idf_sys::esp_timer_get_time() };
        us.max(0) as u64 / 1000
    }

    /// Milliseconds since the clock was created.
    #[cfg(not(feature = "espidf"))]
    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
