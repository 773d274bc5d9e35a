//! Small drivers that sit between the hardware and the service: the
//! one-shot ADC, pairing button classification and status LED patterns.

pub mod adc;
pub mod button;
pub mod status_led;
