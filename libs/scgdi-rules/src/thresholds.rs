//! Nominal values and alarm bounds

use serde::{Deserialize, Serialize};

/// Fixed rule configuration. Defaults match the commissioned motor:
/// 220 V / 10 A nominal, 10% over/under tolerance, 60 °C case limit,
/// 0.2 g vibration warning bound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_nominal_voltage")]
    pub nominal_voltage: f64,
    #[serde(default = "default_nominal_current")]
    pub nominal_current: f64,
    #[serde(default = "default_over_under_tol")]
    pub over_under_tol: f64,
    #[serde(default = "default_case_temp_crit")]
    pub case_temp_crit: f64,
    #[serde(default = "default_vibration_warn")]
    pub vibration_warn: f64,
}

fn default_nominal_voltage() -> f64 {
    220.0
}

fn default_nominal_current() -> f64 {
    10.0
}

fn default_over_under_tol() -> f64 {
    0.10
}

fn default_case_temp_crit() -> f64 {
    60.0
}

fn default_vibration_warn() -> f64 {
    0.2
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            nominal_voltage: default_nominal_voltage(),
            nominal_current: default_nominal_current(),
            over_under_tol: default_over_under_tol(),
            case_temp_crit: default_case_temp_crit(),
            vibration_warn: default_vibration_warn(),
        }
    }
}
