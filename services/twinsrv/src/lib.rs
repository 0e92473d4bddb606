//! twinsrv - SCGDI motor digital twin
//!
//! Ingests motor telemetry (electrical, environment, vibration) from
//! MQTT, mirrors the current state as a browsable variable tree,
//! evaluates threshold alarms on each update, and persists both the
//! variable history and the alarm/event history to SQLite.
//!
//! # Architecture
//!
//! ```text
//! MQTT ──▶ transport ──▶ pipeline ──▶ mirror (tree + events)
//!                           │    └──▶ rules ──▶ fire_event
//!                           ▼
//!                     scgdi-store (var_history / event_history)
//! ```

pub mod api;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod mirror;
pub mod net;
pub mod pipeline;
pub mod transport;

pub use error::{Result, TwinSrvError};
