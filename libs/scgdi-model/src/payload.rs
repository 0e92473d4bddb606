//! Canonical payload types, one per measurement domain
//!
//! Field names mirror the canonical JSON schema published on the
//! `scgdi/motor/*` topics. Numeric leaves default to 0.0 when absent;
//! the structural keys (timestamp and the electrical groups) are
//! required and their absence fails validation.

use crate::domain::Domain;
use serde::{Deserialize, Serialize};

/// Per-phase readings for a three-phase quantity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseValues {
    #[serde(default)]
    pub a: f64,
    #[serde(default)]
    pub b: f64,
    #[serde(default)]
    pub c: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerTriple {
    #[serde(default)]
    pub active: f64,
    #[serde(default)]
    pub reactive: f64,
    #[serde(default)]
    pub apparent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyTriple {
    #[serde(default)]
    pub active: f64,
    #[serde(default)]
    pub reactive: f64,
    #[serde(default)]
    pub apparent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalPayload {
    pub timestamp: String,
    pub voltage: PhaseValues,
    pub current: PhaseValues,
    pub power: PowerTriple,
    pub energy: EnergyTriple,
    #[serde(rename = "powerFactor", default)]
    pub power_factor: f64,
    #[serde(default)]
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentPayload {
    pub timestamp: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(rename = "caseTemperature", default)]
    pub case_temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibrationPayload {
    pub timestamp: String,
    #[serde(default)]
    pub axial: f64,
    #[serde(default)]
    pub radial: f64,
}

/// Canonical payload for one domain, selected by topic lookup
#[derive(Debug, Clone, PartialEq)]
pub enum MotorPayload {
    Electrical(ElectricalPayload),
    Environment(EnvironmentPayload),
    Vibration(VibrationPayload),
}

impl MotorPayload {
    pub fn domain(&self) -> Domain {
        match self {
            MotorPayload::Electrical(_) => Domain::Electrical,
            MotorPayload::Environment(_) => Domain::Environment,
            MotorPayload::Vibration(_) => Domain::Vibration,
        }
    }

    /// Source timestamp carried by the payload (ISO-8601)
    pub fn timestamp(&self) -> &str {
        match self {
            MotorPayload::Electrical(p) => &p.timestamp,
            MotorPayload::Environment(p) => &p.timestamp,
            MotorPayload::Vibration(p) => &p.timestamp,
        }
    }

    /// Flatten into (variable name, value) pairs in fixed ingestion order.
    ///
    /// This is the order var_history rows are appended in, matching the
    /// domain's variable table.
    pub fn fields(&self) -> Vec<(&'static str, f64)> {
        match self {
            MotorPayload::Electrical(p) => vec![
                ("VoltageA", p.voltage.a),
                ("VoltageB", p.voltage.b),
                ("VoltageC", p.voltage.c),
                ("CurrentA", p.current.a),
                ("CurrentB", p.current.b),
                ("CurrentC", p.current.c),
                ("PowerActive", p.power.active),
                ("PowerReactive", p.power.reactive),
                ("PowerApparent", p.power.apparent),
                ("EnergyActive", p.energy.active),
                ("EnergyReactive", p.energy.reactive),
                ("EnergyApparent", p.energy.apparent),
                ("PowerFactor", p.power_factor),
                ("Frequency", p.frequency),
            ],
            MotorPayload::Environment(p) => vec![
                ("Temperature", p.temperature),
                ("Humidity", p.humidity),
                ("CaseTemperature", p.case_temperature),
            ],
            MotorPayload::Vibration(p) => {
                vec![("Axial", p.axial), ("Radial", p.radial)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;

    #[test]
    fn field_order_matches_domain_tables() {
        let payload = MotorPayload::Electrical(ElectricalPayload {
            timestamp: "2025-08-14T00:00:00Z".to_string(),
            voltage: PhaseValues { a: 1.0, b: 2.0, c: 3.0 },
            current: PhaseValues::default(),
            power: PowerTriple::default(),
            energy: EnergyTriple::default(),
            power_factor: 0.95,
            frequency: 60.0,
        });
        let names: Vec<&str> = payload.fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, Domain::Electrical.variables());
    }

    #[test]
    fn missing_numeric_leaves_default_to_zero() {
        let body = r#"{
            "timestamp": "2025-08-14T00:00:00Z",
            "voltage": {"a": 220.0},
            "current": {},
            "power": {"active": 4500.0},
            "energy": {},
            "frequency": 60.0
        }"#;
        let p: ElectricalPayload = serde_json::from_str(body).unwrap();
        assert_eq!(p.voltage.b, 0.0);
        assert_eq!(p.power.reactive, 0.0);
        assert_eq!(p.power_factor, 0.0);
    }

    #[test]
    fn missing_structural_key_fails() {
        // no voltage group at all
        let body = r#"{
            "timestamp": "2025-08-14T00:00:00Z",
            "current": {}, "power": {}, "energy": {}
        }"#;
        assert!(serde_json::from_str::<ElectricalPayload>(body).is_err());
    }
}
