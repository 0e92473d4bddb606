//! Ingestion pipeline
//!
//! One message walks: decode → mirror update → rule evaluation → event
//! emission → persistence. Decode failures drop the message; every
//! later stage is best-effort and sequential. Persistence is the
//! authoritative record: an event row is appended whether or not the
//! live emission succeeded, and a failed store write is logged and
//! skipped without stalling subsequent messages.

use crate::mirror::{AddressSpace, VarHandle};
use chrono::Utc;
use scgdi_model::{decode, Domain, MotorPayload, Severity, MOTOR_NODE_NAME};
use scgdi_rules::{evaluate, Thresholds};
use scgdi_store::HistoryStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Heartbeat cadence: one status/INFO event per interval
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// The orchestrator. Owns the variable handle set and issues every
/// mirror mutation; constructed once at startup and passed through.
pub struct Pipeline<M: AddressSpace> {
    mirror: Arc<M>,
    store: HistoryStore,
    thresholds: Thresholds,
    vars: HashMap<&'static str, VarHandle>,
}

impl<M: AddressSpace> Pipeline<M> {
    pub fn new(
        mirror: Arc<M>,
        store: HistoryStore,
        thresholds: Thresholds,
        vars: HashMap<&'static str, VarHandle>,
    ) -> Self {
        Self {
            mirror,
            store,
            thresholds,
            vars,
        }
    }

    /// Entry point for one raw transport message
    pub async fn ingest(&self, topic: &str, body: &[u8]) {
        let Some(domain) = Domain::for_topic(topic) else {
            debug!("Ignoring message on unmapped topic {}", topic);
            return;
        };
        match decode(domain, body) {
            Ok(payload) => self.apply(payload).await,
            Err(e) => warn!("Dropping invalid payload on {}: {}", topic, e),
        }
    }

    /// Apply a canonical payload: write and persist every field in
    /// fixed order, then evaluate alarms
    pub async fn apply(&self, payload: MotorPayload) {
        let ts = payload.timestamp().to_string();
        let domain = payload.domain();

        for (name, value) in payload.fields() {
            self.set_and_store(domain, name, &ts, value).await;
        }

        for alarm in evaluate(&payload, &self.thresholds) {
            self.fire_event(
                alarm.source,
                alarm.category.as_str(),
                alarm.message,
                alarm.severity,
            )
            .await;
        }
    }

    /// Write one variable to the mirror and unconditionally append its
    /// var_history row. Runs for every field, alarm or not.
    async fn set_and_store(&self, domain: Domain, name: &str, ts: &str, value: f64) {
        match self.vars.get(name) {
            Some(&handle) => {
                if let Err(e) = self.mirror.write(handle, value) {
                    error!("Mirror write failed for {}: {}", name, e);
                }
            }
            None => error!("No mirror variable named {}", name),
        }

        let path = domain.qualified_path(name);
        if let Err(e) = self.store.add_var(ts, &path, value, None).await {
            error!("var_history write failed for {}: {}", path, e);
        }
    }

    /// Emit an event (best-effort) and persist it regardless of the
    /// emission outcome
    pub async fn fire_event(&self, source: &str, category: &str, message: &str, severity: Severity) {
        let ts = Utc::now().to_rfc3339();

        let recorded_source = match self.mirror.emit_event(source, category, message, severity) {
            Ok(emitting) => emitting,
            Err(e) => {
                warn!("Event emission failed (category={}): {}", category, e);
                source.to_string()
            }
        };

        if let Err(e) = self
            .store
            .add_event(&ts, &recorded_source, message, severity.value(), category)
            .await
        {
            error!("event_history write failed (category={}): {}", category, e);
        }
    }

    /// Periodic liveness event from the device root, independent of
    /// sensor traffic
    pub async fn run_heartbeat(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.fire_event(MOTOR_NODE_NAME, "status", "heartbeat", Severity::Info)
                .await;
        }
    }
}
