//! SCGDI Model - Motor telemetry schemas
//!
//! Canonical payload types for the three measurement domains of the
//! Motor50CV twin, plus the normalization layer that maps legacy flat
//! sensor messages into the canonical shape.
//!
//! # Architecture
//!
//! ```text
//! MQTT topic ──▶ Domain::for_topic ──▶ decode ──▶ MotorPayload
//!                                        │
//!                                   normalize_* (legacy shapes)
//! ```

mod domain;
mod error;
pub mod normalize;
mod payload;
mod severity;

pub use domain::{
    Domain, ELECTRICAL_VARS, ENVIRONMENT_VARS, MOTOR_NODE_NAME, SUBSCRIBED_TOPICS, VIBRATION_VARS,
};
pub use error::{ModelError, Result};
pub use normalize::decode;
pub use payload::{
    ElectricalPayload, EnergyTriple, EnvironmentPayload, MotorPayload, PhaseValues, PowerTriple,
    VibrationPayload,
};
pub use severity::Severity;
