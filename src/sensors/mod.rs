//! Analog temperature inputs.
//!
//! [`AnalogSensors`] implements [`SensorPort`] for the two probes.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: ADC1 oneshot reads, normalised from the native 12-bit
//! range to 10 bits.
//! On host/test: reads from per-channel `AtomicU16`s set with
//! [`sim_set_raw`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::app::ports::{SensorChannel, SensorPort};
use crate::error::Error;

#[cfg(not(target_os = "espidf"))]
static SIM_CORE_RAW: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_WATER_RAW: AtomicU16 = AtomicU16::new(0);

/// Inject a raw reading for `channel` (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_raw(channel: SensorChannel, raw: u16) {
    match channel {
        SensorChannel::Core => SIM_CORE_RAW.store(raw, Ordering::Relaxed),
        SensorChannel::Water => SIM_WATER_RAW.store(raw, Ordering::Relaxed),
    }
}

pub struct AnalogSensors {
    #[cfg(target_os = "espidf")]
    adc: esp_idf_svc::sys::adc_oneshot_unit_handle_t,
}

impl AnalogSensors {
    /// Configure ADC1 and both probe channels.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self, Error> {
        use crate::pins;
        use esp_idf_svc::sys::*;

        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut adc: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: `adc` is a valid out-pointer for the new unit handle.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut adc) };
        if ret != ESP_OK as i32 {
            return Err(Error::Init("ADC1 unit"));
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        for channel in [pins::CORE_TEMP_ADC_CHANNEL, pins::WATER_TEMP_ADC_CHANNEL] {
            // SAFETY: `adc` was just created and is owned by this function.
            let ret = unsafe { adc_oneshot_config_channel(adc, channel, &chan_cfg) };
            if ret != ESP_OK as i32 {
                return Err(Error::Init("ADC1 channel"));
            }
        }

        log::info!(
            "sensors: ADC1 configured (CH{}=core, CH{}=water)",
            pins::CORE_TEMP_ADC_CHANNEL,
            pins::WATER_TEMP_ADC_CHANNEL
        );
        Ok(Self { adc })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, Error> {
        log::info!("sensors(sim): ADC init skipped");
        Ok(Self {})
    }
}

#[cfg(target_os = "espidf")]
impl SensorPort for AnalogSensors {
    fn read_raw(&mut self, channel: SensorChannel) -> u16 {
        use crate::pins;

        let adc_channel = match channel {
            SensorChannel::Core => pins::CORE_TEMP_ADC_CHANNEL,
            SensorChannel::Water => pins::WATER_TEMP_ADC_CHANNEL,
        };
        let mut raw: i32 = 0;
        // SAFETY: the handle is owned by `self` and only used from the main loop.
        let ret = unsafe { esp_idf_svc::sys::adc_oneshot_read(self.adc, adc_channel, &mut raw) };
        if ret != esp_idf_svc::sys::ESP_OK as i32 {
            log::warn!("sensors: ADC read failed on {:?} (rc={})", channel, ret);
            return 0;
        }
        (raw.max(0) as u16) >> (pins::ADC_NATIVE_BITS - pins::ADC_REPORTED_BITS)
    }
}

#[cfg(not(target_os = "espidf"))]
impl SensorPort for AnalogSensors {
    fn read_raw(&mut self, channel: SensorChannel) -> u16 {
        match channel {
            SensorChannel::Core => SIM_CORE_RAW.load(Ordering::Relaxed),
            SensorChannel::Water => SIM_WATER_RAW.load(Ordering::Relaxed),
        }
    }
}
