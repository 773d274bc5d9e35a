//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the ADC sampler and the four digital lines, exposing them through
//! [`SensorPort`] and [`DigitalIoPort`].  Lines are any `embedded-hal` 1.0
//! pins, so on target they are `esp-idf-hal` `PinDriver`s and under test
//! plain fakes.  The pairing button, kettle button and status LED are
//! optional; an absent one reports [`IoError::LineUnavailable`].

use embedded_hal::digital::{Error as _, InputPin, OutputPin, PinState};
use log::debug;

use crate::app::ports::{DigitalIoPort, InputLine, OutputLine, SensorPort};
use crate::drivers::adc::AdcSampler;
use crate::error::{IoError, SensorError};
use crate::sensors::Channel;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<A, H, P, K, L> {
    adc: A,
    heating: H,
    pairing: Option<P>,
    pairing_active_low: bool,
    kettle_button: Option<K>,
    led: Option<L>,
}

impl<A, H, P, K, L> HardwareAdapter<A, H, P, K, L>
where
    A: AdcSampler,
    H: InputPin,
    P: InputPin,
    K: OutputPin,
    L: OutputPin,
{
    pub fn new(
        adc: A,
        heating: H,
        pairing: Option<P>,
        kettle_button: Option<K>,
        led: Option<L>,
    ) -> Self {
        Self {
            adc,
            heating,
            pairing,
            pairing_active_low: false,
            kettle_button,
            led,
        }
    }

    /// Treat a low pairing line as "pressed".
    #[must_use]
    pub fn with_pairing_active_low(mut self, active_low: bool) -> Self {
        self.pairing_active_low = active_low;
        self
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<A, H, P, K, L> SensorPort for HardwareAdapter<A, H, P, K, L>
where
    A: AdcSampler,
{
    fn read_raw(&mut self, channel: Channel) -> Result<u16, SensorError> {
        self.adc.sample(channel)
    }
}

// ── DigitalIoPort implementation ──────────────────────────────

impl<A, H, P, K, L> DigitalIoPort for HardwareAdapter<A, H, P, K, L>
where
    H: InputPin,
    P: InputPin,
    K: OutputPin,
    L: OutputPin,
{
    fn read_level(&mut self, line: InputLine) -> Result<bool, IoError> {
        match line {
            InputLine::HeatingState => self.heating.is_high().map_err(|e| {
                debug!("heating line: {:?}", e.kind());
                IoError::ReadFailed
            }),
            InputLine::PairingButton => {
                let pin = self.pairing.as_mut().ok_or(IoError::LineUnavailable)?;
                let high = pin.is_high().map_err(|e| {
                    debug!("pairing line: {:?}", e.kind());
                    IoError::ReadFailed
                })?;
                Ok(high != self.pairing_active_low)
            }
        }
    }

    fn set_level(&mut self, line: OutputLine, high: bool) -> Result<(), IoError> {
        let state = PinState::from(high);
        let result = match line {
            OutputLine::KettleButton => self
                .kettle_button
                .as_mut()
                .ok_or(IoError::LineUnavailable)?
                .set_state(state)
                .map_err(|e| e.kind()),
            OutputLine::StatusLed => self
                .led
                .as_mut()
                .ok_or(IoError::LineUnavailable)?
                .set_state(state)
                .map_err(|e| e.kind()),
        };
        result.map_err(|kind| {
            debug!("{line:?}: {kind:?}");
            IoError::WriteFailed
        })
    }
}
