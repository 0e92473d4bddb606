//! Measurement domains and the fixed address-space layout

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root node of the motor address space
pub const MOTOR_NODE_NAME: &str = "Motor50CV";

/// Electrical leaf variables, in ingestion order
pub const ELECTRICAL_VARS: [&str; 14] = [
    "VoltageA",
    "VoltageB",
    "VoltageC",
    "CurrentA",
    "CurrentB",
    "CurrentC",
    "PowerActive",
    "PowerReactive",
    "PowerApparent",
    "EnergyActive",
    "EnergyReactive",
    "EnergyApparent",
    "PowerFactor",
    "Frequency",
];

/// Environment leaf variables, in ingestion order
pub const ENVIRONMENT_VARS: [&str; 3] = ["Temperature", "Humidity", "CaseTemperature"];

/// Vibration leaf variables, in ingestion order
pub const VIBRATION_VARS: [&str; 2] = ["Axial", "Radial"];

/// All inbound topics, canonical names first, then the sensor-side aliases
pub const SUBSCRIBED_TOPICS: [&str; 9] = [
    "scgdi/motor/electrical",
    "scgdi/motor/environment",
    "scgdi/motor/vibration",
    "scgdi/sensor/electrical",
    "scgdi/sensor/environment",
    "scgdi/sensor/vibration",
    "scgdi/sensor/energia",
    "scgdi/sensor/ambiente",
    "scgdi/sensor/vibracao",
];

/// One of the three measurement domains of the motor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Electrical,
    Environment,
    Vibration,
}

impl Domain {
    /// Map an inbound MQTT topic to its domain.
    ///
    /// Canonical topics, `scgdi/sensor/*` aliases and the Portuguese
    /// legacy aliases all resolve to the same domain.
    pub fn for_topic(topic: &str) -> Option<Domain> {
        match topic {
            "scgdi/motor/electrical" | "scgdi/sensor/electrical" | "scgdi/sensor/energia" => {
                Some(Domain::Electrical)
            }
            "scgdi/motor/environment" | "scgdi/sensor/environment" | "scgdi/sensor/ambiente" => {
                Some(Domain::Environment)
            }
            "scgdi/motor/vibration" | "scgdi/sensor/vibration" | "scgdi/sensor/vibracao" => {
                Some(Domain::Vibration)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Electrical => "Electrical",
            Domain::Environment => "Environment",
            Domain::Vibration => "Vibration",
        }
    }

    /// Leaf variable names owned by this domain, in ingestion order
    pub fn variables(&self) -> &'static [&'static str] {
        match self {
            Domain::Electrical => &ELECTRICAL_VARS,
            Domain::Environment => &ENVIRONMENT_VARS,
            Domain::Vibration => &VIBRATION_VARS,
        }
    }

    /// Dotted history path for one of this domain's variables,
    /// e.g. `Motor50CV.Electrical.VoltageA`
    pub fn qualified_path(&self, var: &str) -> String {
        format!("{}.{}.{}", MOTOR_NODE_NAME, self.as_str(), var)
    }

    /// Domain owning a variable name, if any
    pub fn of_variable(var: &str) -> Option<Domain> {
        if ELECTRICAL_VARS.contains(&var) {
            Some(Domain::Electrical)
        } else if ENVIRONMENT_VARS.contains(&var) {
            Some(Domain::Environment)
        } else if VIBRATION_VARS.contains(&var) {
            Some(Domain::Vibration)
        } else {
            None
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
