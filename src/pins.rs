//! Peripheral assignments for the controller board.
//!
//! Single source of truth for which ADC inputs the two temperature
//! probes are wired to.

// ---------------------------------------------------------------------------
// Temperature probes (TMP36-style, ADC1 oneshot)
// ---------------------------------------------------------------------------

/// Core probe.  ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const CORE_TEMP_ADC_CHANNEL: u32 = 0;
/// Water probe.  ADC1 channel 1 (GPIO 2 on ESP32-S3).
pub const WATER_TEMP_ADC_CHANNEL: u32 = 1;

/// Native ADC1 resolution in bits.
pub const ADC_NATIVE_BITS: u32 = 12;
/// Resolution readings are normalised to before calibration, so the
/// default `max_raw` of 1023 applies on every board.
pub const ADC_REPORTED_BITS: u32 = 10;
/// ADC1 full-scale input at 12 dB attenuation, in volts.
pub const ADC_FULL_SCALE_VOLTS: f32 = 3.1;
