//! One-shot ADC1 sampler for the dial and water temperature inputs.
//!
//! - **`feature = "espidf"`**: raw ESP-IDF `adc_oneshot_*` calls, 12 dB
//!   attenuation, 12-bit width.
//! - otherwise: per-channel simulated values for host runs and tests.

#[cfg(feature = "espidf")]
use esp_idf_sys::*;

use log::info;

use crate::error::SensorError;
use crate::pins;
use crate::sensors::Channel;

/// Anything that can produce one raw 12-bit sample per channel.
pub trait AdcSampler {
    fn sample(&mut self, channel: Channel) -> Result<u16, SensorError>;
}

pub struct OneshotAdc {
    #[cfg(feature = "espidf")]
    handle: adc_oneshot_unit_handle_t,
    #[cfg(not(feature = "espidf"))]
    simulated: [Option<u16>; 2],
}

#[cfg(feature = "espidf")]
const fn adc_channel(channel: Channel) -> u32 {
    match channel {
        Channel::TargetDial => pins::TARGET_DIAL_ADC_CHANNEL,
        Channel::WaterTemperature => pins::WATER_TEMP_ADC_CHANNEL,
    }
}

#[cfg(feature = "espidf")]
impl OneshotAdc {
    /// Create the ADC1 unit and configure both channels.  Called once
    /// from `main()` before the loop starts.
    pub fn new() -> Result<Self, SensorError> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: single call at boot; `handle` outlives the call.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) };
        if ret != ESP_OK as i32 {
            log::error!("ADC1 unit init failed (rc={ret})");
            return Err(SensorError::NotReady);
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        for channel in [Channel::TargetDial, Channel::WaterTemperature] {
            // SAFETY: `handle` was just created by adc_oneshot_new_unit.
            let ret = unsafe { adc_oneshot_config_channel(handle, adc_channel(channel), &chan_cfg) };
            if ret != ESP_OK as i32 {
                log::error!("ADC1 channel {} config failed (rc={ret})", adc_channel(channel));
                return Err(SensorError::NotReady);
            }
        }

        info!(
            "ADC1 configured (CH{}=dial, CH{}=water)",
            pins::TARGET_DIAL_ADC_CHANNEL,
            pins::WATER_TEMP_ADC_CHANNEL
        );
        Ok(Self { handle })
    }
}

#[cfg(feature = "espidf")]
impl AdcSampler for OneshotAdc {
    fn sample(&mut self, channel: Channel) -> Result<u16, SensorError> {
        let mut raw: i32 = 0;
        // SAFETY: the handle is owned by `self` and only used from the main loop.
        let ret = unsafe { adc_oneshot_read(self.handle, adc_channel(channel), &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(raw.clamp(0, i32::from(u16::MAX)) as u16)
    }
}

#[cfg(not(feature = "espidf"))]
impl OneshotAdc {
    pub fn new() -> Result<Self, SensorError> {
        info!(
            "ADC1 (sim): CH{}=dial, CH{}=water",
            pins::TARGET_DIAL_ADC_CHANNEL,
            pins::WATER_TEMP_ADC_CHANNEL
        );
        Ok(Self {
            simulated: [None; 2],
        })
    }

    /// Value returned by the next samples of `channel`.  Unset channels
    /// report [`SensorError::NotReady`].
    pub fn set_simulated(&mut self, channel: Channel, raw: u16) {
        self.simulated[channel as usize] = Some(raw);
    }
}

#[cfg(not(feature = "espidf"))]
impl AdcSampler for OneshotAdc {
    fn sample(&mut self, channel: Channel) -> Result<u16, SensorError> {
        self.simulated[channel as usize].ok_or(SensorError::NotReady)
    }
}
