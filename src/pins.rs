//! GPIO / ADC assignments for the kettle bridge board (ESP32-C6).
//!
//! Single source of truth: drivers and `main()` reference these rather
//! than hard-coding numbers.

// ---------------------------------------------------------------------------
// Analog inputs (ADC1, 12 dB attenuation, 12-bit)
// ---------------------------------------------------------------------------

/// Target temperature dial wiper, behind a 1:2 divider.
pub const TARGET_DIAL_GPIO: i32 = 2;
pub const TARGET_DIAL_ADC_CHANNEL: u32 = 2;

/// Water temperature NTC divider, behind a 1:2 divider.  Reads near zero
/// with the kettle lifted off its base.
pub const WATER_TEMP_GPIO: i32 = 3;
pub const WATER_TEMP_ADC_CHANNEL: u32 = 3;

// ---------------------------------------------------------------------------
// Digital lines
// ---------------------------------------------------------------------------

/// Input: HIGH while the heating element is powered.
pub const HEATING_STATE_GPIO: i32 = 4;

/// Output: drives the transistor across the kettle's own button.
pub const KETTLE_BUTTON_GPIO: i32 = 5;

/// Output: network status LED, active HIGH.
pub const STATUS_LED_GPIO: i32 = 8;

/// Input: pairing button (the BOOT button), active LOW with pull-up.
pub const PAIRING_BUTTON_GPIO: i32 = 9;
pub const PAIRING_BUTTON_ACTIVE_LOW: bool = true;
