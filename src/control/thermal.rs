//! Two-zone thermal model.
//!
//! The water zone is driven directly by the active mode; the core zone
//! follows it at a fraction of the water's rate, so the core always lags.
//! In IDLE both zones relax exponentially toward ambient.

use crate::config::ModelParams;
use crate::fsm::OperatingMode;

/// Lower bound of every reported temperature.
pub const TEMP_MIN: f32 = 0.0;
/// Upper bound of every reported temperature.
pub const TEMP_MAX: f32 = 100.0;

/// Core and water temperatures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalState {
    pub core_temp: f32,
    pub water_temp: f32,
}

impl Default for ThermalState {
    fn default() -> Self {
        Self {
            core_temp: 25.0,
            water_temp: 25.0,
        }
    }
}

impl ThermalState {
    pub fn new(core_temp: f32, water_temp: f32) -> Self {
        Self {
            core_temp,
            water_temp,
        }
    }

    /// Both values clamped into `[TEMP_MIN, TEMP_MAX]`.
    pub fn clamped(self) -> Self {
        Self {
            core_temp: self.core_temp.clamp(TEMP_MIN, TEMP_MAX),
            water_temp: self.water_temp.clamp(TEMP_MIN, TEMP_MAX),
        }
    }
}

/// Advance the model by one tick.
pub fn step(state: ThermalState, mode: OperatingMode, params: &ModelParams) -> ThermalState {
    let ThermalState {
        mut core_temp,
        mut water_temp,
    } = state;

    match mode {
        OperatingMode::Heat => {
            water_temp += params.heat_rate;
            if water_temp > core_temp {
                core_temp = (core_temp + params.heat_rate * params.heat_coupling).min(water_temp);
            }
        }
        OperatingMode::Cool => {
            water_temp -= params.cool_rate;
            if water_temp < core_temp {
                core_temp = (core_temp - params.cool_rate * params.cool_coupling).max(water_temp);
            }
        }
        OperatingMode::Idle => {
            water_temp += (params.ambient - water_temp) * params.relaxation;
            core_temp += (params.ambient - core_temp) * params.relaxation;
        }
    }

    ThermalState {
        core_temp,
        water_temp,
    }
    .clamped()
}
