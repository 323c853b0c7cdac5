//! Controller configuration.
//!
//! Resolved once at startup (defaults, or a JSON file on the host) and
//! handed to [`Controller::new`](crate::app::service::Controller::new).
//! Nothing re-reads it afterwards.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where temperatures come from on each update tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureSource {
    /// Run the thermal model.
    Simulated,
    /// Read the two analog channels.
    Sensor,
}

/// Which transport carries the line protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkConfig {
    /// Single-client TCP server.
    Network { port: u16 },
    /// Serial port (USB CDC / UART).
    Serial { path: String, baud_rate: u32 },
}

/// Thermal model constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Water temperature rise per tick in HEAT.
    pub heat_rate: f32,
    /// Water temperature drop per tick in COOL.
    pub cool_rate: f32,
    /// Fraction of `heat_rate` applied to the core while it trails the water.
    pub heat_coupling: f32,
    /// Fraction of `cool_rate` applied to the core while it leads the water.
    pub cool_coupling: f32,
    /// Temperature both zones relax toward in IDLE.
    pub ambient: f32,
    /// Fraction of the distance to `ambient` covered per IDLE tick.
    pub relaxation: f32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            heat_rate: 0.3,
            cool_rate: 0.25,
            heat_coupling: 0.9,
            cool_coupling: 0.8,
            ambient: 25.0,
            relaxation: 0.05,
        }
    }
}

/// Linear raw-count → temperature transform.
///
/// `temperature = (raw * reference_voltage / max_raw - offset) * scale`
///
/// Defaults describe a TMP36 read at 10 bits.  The full-scale voltage is
/// 5 V on the host and the ADC1 range from [`pins`](crate::pins) on the
/// device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorCalibration {
    pub reference_voltage: f32,
    pub max_raw: u16,
    pub offset: f32,
    pub scale: f32,
}

#[cfg(target_os = "espidf")]
const DEFAULT_REFERENCE_VOLTAGE: f32 = crate::pins::ADC_FULL_SCALE_VOLTS;
#[cfg(not(target_os = "espidf"))]
const DEFAULT_REFERENCE_VOLTAGE: f32 = 5.0;

impl Default for SensorCalibration {
    fn default() -> Self {
        Self::tmp36(DEFAULT_REFERENCE_VOLTAGE)
    }
}

impl SensorCalibration {
    /// TMP36 (500 mV offset, 10 mV/°C) on a 10-bit reading whose full
    /// scale is `reference_voltage`.
    pub fn tmp36(reference_voltage: f32) -> Self {
        Self {
            reference_voltage,
            max_raw: 1023,
            offset: 0.5,
            scale: 100.0,
        }
    }

    /// Convert a raw ADC count into degrees.
    pub fn to_temperature(&self, raw: u16) -> f32 {
        let voltage = raw as f32 * self.reference_voltage / self.max_raw as f32;
        (voltage - self.offset) * self.scale
    }
}

/// Bounded retry policy for link (re)establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Minimum spacing between two attempts.
    pub interval_ms: u32,
    /// Attempts before giving up.  `0` retries forever.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_attempts: 10,
        }
    }
}

/// Complete controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub temperature_source: TemperatureSource,
    pub link: LinkConfig,

    // --- Timing ---
    /// Thermal model / sensor refresh interval (milliseconds).
    pub update_interval_ms: u32,
    /// Telemetry transmit interval (milliseconds).
    pub transmit_interval_ms: u32,
    /// Host-only pause between loop passes (milliseconds).
    pub loop_idle_ms: u32,

    pub model: ModelParams,
    pub calibration: SensorCalibration,
    pub reconnect: RetryPolicy,
}

/// Default TCP port of the telemetry server.
pub const DEFAULT_PORT: u16 = 12345;

/// Default serial link speed.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            temperature_source: TemperatureSource::Simulated,
            link: LinkConfig::Network { port: DEFAULT_PORT },
            update_interval_ms: 1000,
            transmit_interval_ms: 1000,
            loop_idle_ms: 10,
            model: ModelParams::default(),
            calibration: SensorCalibration::default(),
            reconnect: RetryPolicy::default(),
        }
    }
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

fn fraction(v: f32) -> bool {
    v.is_finite() && v > 0.0 && v < 1.0
}

impl ControllerConfig {
    /// Reject out-of-range values.  Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("update_interval_ms must be > 0"));
        }
        if self.transmit_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("transmit_interval_ms must be > 0"));
        }

        let m = &self.model;
        if !positive(m.heat_rate) {
            return Err(ConfigError::ValidationFailed("model.heat_rate must be > 0"));
        }
        if !positive(m.cool_rate) {
            return Err(ConfigError::ValidationFailed("model.cool_rate must be > 0"));
        }
        if !fraction(m.heat_coupling) {
            return Err(ConfigError::ValidationFailed("model.heat_coupling must be in (0, 1)"));
        }
        if !fraction(m.cool_coupling) {
            return Err(ConfigError::ValidationFailed("model.cool_coupling must be in (0, 1)"));
        }
        if !(m.relaxation.is_finite() && m.relaxation > 0.0 && m.relaxation <= 1.0) {
            return Err(ConfigError::ValidationFailed("model.relaxation must be in (0, 1]"));
        }
        if !(0.0..=100.0).contains(&m.ambient) {
            return Err(ConfigError::ValidationFailed("model.ambient must be in [0, 100]"));
        }

        let c = &self.calibration;
        if c.max_raw == 0 {
            return Err(ConfigError::ValidationFailed("calibration.max_raw must be > 0"));
        }
        if !c.reference_voltage.is_finite() || !c.offset.is_finite() || !c.scale.is_finite() {
            return Err(ConfigError::ValidationFailed("calibration values must be finite"));
        }

        if let LinkConfig::Serial { path, baud_rate } = &self.link {
            if path.is_empty() {
                return Err(ConfigError::ValidationFailed("link.path must not be empty"));
            }
            if *baud_rate == 0 {
                return Err(ConfigError::ValidationFailed("link.baud_rate must be > 0"));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON document.  Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::Io)?;
        Self::from_json(&text)
    }
}
