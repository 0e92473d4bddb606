//! Payload normalization
//!
//! Two inbound conventions coexist on the wire: bodies already in the
//! canonical schema, and the flat legacy sensor shape (`Voltage`,
//! `Current`, `Power`, `Accell_X`, ...). When any legacy key is present
//! the body is rewritten into the canonical shape: scalar voltage and
//! current are broadcast across the three phases, scalar power becomes
//! the active component with reactive 0, and the timestamp is stamped
//! as "now" since legacy senders carry no usable device time.

use crate::domain::Domain;
use crate::error::{ModelError, Result};
use crate::payload::{
    ElectricalPayload, EnergyTriple, EnvironmentPayload, MotorPayload, PhaseValues, PowerTriple,
    VibrationPayload,
};
use chrono::Utc;
use serde_json::Value;

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

fn num(body: &Value, key: &str) -> f64 {
    body.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn has_any(body: &Value, keys: &[&str]) -> bool {
    keys.iter().any(|k| body.get(*k).is_some())
}

/// Rewrite a legacy flat electrical body into the canonical shape.
/// Canonical bodies pass through untouched.
pub fn normalize_electrical(body: &Value) -> Option<ElectricalPayload> {
    if !has_any(body, &["Voltage", "Current", "Power"]) {
        return None;
    }
    let v = num(body, "Voltage");
    let i = num(body, "Current");
    let p = num(body, "Power");
    Some(ElectricalPayload {
        timestamp: now_iso(),
        voltage: PhaseValues { a: v, b: v, c: v },
        current: PhaseValues { a: i, b: i, c: i },
        power: PowerTriple { active: p, reactive: 0.0, apparent: p },
        energy: EnergyTriple::default(),
        power_factor: 0.95,
        frequency: 60.0,
    })
}

pub fn normalize_environment(body: &Value) -> Option<EnvironmentPayload> {
    if !has_any(body, &["Temperature", "Humidity", "CaseTemperature"]) {
        return None;
    }
    Some(EnvironmentPayload {
        timestamp: now_iso(),
        temperature: num(body, "Temperature"),
        humidity: num(body, "Humidity"),
        case_temperature: num(body, "CaseTemperature"),
    })
}

pub fn normalize_vibration(body: &Value) -> Option<VibrationPayload> {
    if !has_any(body, &["Accell_X", "Accell_Y", "Accell_Z"]) {
        return None;
    }
    Some(VibrationPayload {
        timestamp: now_iso(),
        axial: num(body, "Accell_X"),
        radial: num(body, "Accell_Y"),
    })
}

/// Decode a raw message body into the canonical payload for `domain`.
///
/// Legacy-shaped bodies are normalized first; everything else must
/// already match the canonical schema or the message is rejected.
pub fn decode(domain: Domain, bytes: &[u8]) -> Result<MotorPayload> {
    let body: Value = serde_json::from_slice(bytes)?;

    let shape_err = |e: serde_json::Error| ModelError::InvalidShape {
        domain: domain.as_str(),
        reason: e.to_string(),
    };

    match domain {
        Domain::Electrical => match normalize_electrical(&body) {
            Some(p) => Ok(MotorPayload::Electrical(p)),
            None => serde_json::from_value(body)
                .map(MotorPayload::Electrical)
                .map_err(shape_err),
        },
        Domain::Environment => match normalize_environment(&body) {
            Some(p) => Ok(MotorPayload::Environment(p)),
            None => serde_json::from_value(body)
                .map(MotorPayload::Environment)
                .map_err(shape_err),
        },
        Domain::Vibration => match normalize_vibration(&body) {
            Some(p) => Ok(MotorPayload::Vibration(p)),
            None => serde_json::from_value(body)
                .map(MotorPayload::Vibration)
                .map_err(shape_err),
        },
    }
}
