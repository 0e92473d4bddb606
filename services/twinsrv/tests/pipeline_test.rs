//! Ingestion pipeline integration tests
//!
//! Drive the orchestrator end to end over a real temp-file SQLite store
//! and the in-memory mirror, the same way the MQTT task does.

#![allow(clippy::disallowed_methods)] // Integration test - unwrap is acceptable

use scgdi_model::Severity;
use scgdi_store::HistoryStore;
use std::sync::Arc;
use tempfile::TempDir;
use twinsrv::mirror::{AddressSpace, MirrorResult, MirrorError, MirrorTree, VarHandle};
use twinsrv::pipeline::Pipeline;

struct TestEnv {
    #[allow(dead_code)]
    temp_dir: TempDir,
    store: HistoryStore,
    mirror: Arc<MirrorTree>,
    pipeline: Pipeline<MirrorTree>,
}

impl TestEnv {
    async fn create() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test_scgdi.sqlite");
        let store = HistoryStore::connect(db_path.to_str().unwrap()).await.unwrap();

        let (mirror, vars) = MirrorTree::build_motor_tree();
        let mirror = Arc::new(mirror);
        let pipeline = Pipeline::new(mirror.clone(), store.clone(), Default::default(), vars);

        Self { temp_dir, store, mirror, pipeline }
    }
}

const CANONICAL_ELECTRICAL: &str = r#"{
    "timestamp": "2025-08-14T10:00:00Z",
    "voltage": {"a": 220.0, "b": 221.0, "c": 219.0},
    "current": {"a": 10.0, "b": 10.1, "c": 9.9},
    "power": {"active": 4500.0, "reactive": 500.0, "apparent": 4600.0},
    "energy": {"active": 10000.0, "reactive": 1200.0, "apparent": 10200.0},
    "powerFactor": 0.95,
    "frequency": 60.0
}"#;

#[tokio::test]
async fn electrical_payload_writes_fourteen_var_records() {
    let env = TestEnv::create().await;
    env.pipeline.ingest("scgdi/motor/electrical", CANONICAL_ELECTRICAL.as_bytes()).await;

    let (vars, events) = env.store.counts().await.unwrap();
    assert_eq!(vars, 14);
    assert_eq!(events, 0, "nominal payload must not raise alarms");

    let rows = env.store.recent_vars(20, None).await.unwrap();
    assert!(rows.iter().all(|r| r.path.starts_with("Motor50CV.Electrical.")));
    assert!(rows.iter().all(|r| r.ts == "2025-08-14T10:00:00Z"));

    // mirror reflects the latest write
    assert_eq!(
        env.mirror.value_of(scgdi_model::Domain::Electrical, "VoltageB"),
        Some(221.0)
    );
}

#[tokio::test]
async fn legacy_message_broadcasts_and_trips_all_three_phases() {
    let env = TestEnv::create().await;
    // legacy shape on a legacy alias topic
    env.pipeline
        .ingest("scgdi/sensor/energia", br#"{"Voltage": 250.0, "Current": 9.0, "Power": 4000.0}"#)
        .await;

    for phase in ["VoltageA", "VoltageB", "VoltageC"] {
        assert_eq!(
            env.mirror.value_of(scgdi_model::Domain::Electrical, phase),
            Some(250.0)
        );
    }

    let (vars, events) = env.store.counts().await.unwrap();
    assert_eq!(vars, 14);
    assert_eq!(events, 3, "overvoltage on all three phases");

    let rows = env.store.recent_events(10, None).await.unwrap();
    assert!(rows.iter().all(|e| e.message == "Overvoltage detected"));
    assert!(rows.iter().all(|e| e.severity == 700));
    assert!(rows.iter().all(|e| e.source == "Motor50CV.Electrical"));
    assert!(rows.iter().all(|e| e.category.as_deref() == Some("Electrical")));
}

#[tokio::test]
async fn malformed_json_touches_nothing() {
    let env = TestEnv::create().await;
    env.pipeline.ingest("scgdi/motor/vibration", b"{definitely not json").await;
    env.pipeline.ingest("scgdi/motor/electrical", b"[1, 2, 3]").await;

    let (vars, events) = env.store.counts().await.unwrap();
    assert_eq!((vars, events), (0, 0));
    assert_eq!(env.mirror.value_of(scgdi_model::Domain::Vibration, "Axial"), Some(0.0));
}

#[tokio::test]
async fn unmapped_topic_is_ignored() {
    let env = TestEnv::create().await;
    env.pipeline.ingest("scgdi/motor/unknown", CANONICAL_ELECTRICAL.as_bytes()).await;
    let (vars, events) = env.store.counts().await.unwrap();
    assert_eq!((vars, events), (0, 0));
}

#[tokio::test]
async fn replay_appends_independent_records() {
    let env = TestEnv::create().await;
    let body = br#"{"timestamp": "2025-08-14T10:00:00Z", "axial": 0.1, "radial": 0.12}"#;
    env.pipeline.ingest("scgdi/motor/vibration", body).await;
    env.pipeline.ingest("scgdi/motor/vibration", body).await;

    let (vars, _) = env.store.counts().await.unwrap();
    assert_eq!(vars, 4, "two fields, appended twice, no deduplication");
}

#[tokio::test]
async fn vibration_alarm_attributed_to_axial_domain_source() {
    let env = TestEnv::create().await;
    let body = br#"{"timestamp": "2025-08-14T10:00:00Z", "axial": 0.19, "radial": 0.21}"#;
    env.pipeline.ingest("scgdi/motor/vibration", body).await;

    let rows = env.store.recent_events(10, None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].message, "Slight vibration increase");
    assert_eq!(rows[0].severity, 250);
    assert_eq!(rows[0].source, "Motor50CV.Vibration");
}

#[tokio::test]
async fn heartbeat_event_is_persisted_from_device_root() {
    let env = TestEnv::create().await;
    env.pipeline
        .fire_event("Motor50CV", "status", "heartbeat", Severity::Info)
        .await;

    let rows = env.store.recent_events(10, None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source, "Motor50CV");
    assert_eq!(rows[0].message, "heartbeat");
    assert_eq!(rows[0].severity, 100);
    assert_eq!(rows[0].category.as_deref(), Some("status"));
}

#[tokio::test]
async fn live_subscribers_see_emitted_events() {
    let env = TestEnv::create().await;
    let mut rx = env.mirror.subscribe();

    let body = br#"{"timestamp": "2025-08-14T10:00:00Z", "temperature": 35.0,
                    "humidity": 50.0, "caseTemperature": 61.0}"#;
    env.pipeline.ingest("scgdi/motor/environment", body).await;

    let event = rx.try_recv().unwrap();
    assert_eq!(event.message, "Case temperature critical");
    assert_eq!(event.base.severity, 900);
    assert_eq!(event.base.source, "Motor50CV.Environment");
}

/// Mirror whose event path is broken: writes succeed, emission fails
struct BrokenEmitter(MirrorTree);

impl AddressSpace for BrokenEmitter {
    fn write(&self, handle: VarHandle, value: f64) -> MirrorResult<()> {
        self.0.write(handle, value)
    }

    fn emit_event(&self, source: &str, _: &str, _: &str, _: Severity) -> MirrorResult<String> {
        Err(MirrorError::EmitFailed(format!("no notifier for {}", source)))
    }
}

#[tokio::test]
async fn persistence_survives_emission_failure() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("test_scgdi.sqlite");
    let store = HistoryStore::connect(db_path.to_str().unwrap()).await.unwrap();

    let (mirror, vars) = MirrorTree::build_motor_tree();
    let pipeline = Pipeline::new(
        Arc::new(BrokenEmitter(mirror)),
        store.clone(),
        Default::default(),
        vars,
    );

    let body = br#"{"timestamp": "2025-08-14T10:00:00Z", "temperature": 35.0,
                    "humidity": 50.0, "caseTemperature": 61.0}"#;
    pipeline.ingest("scgdi/motor/environment", body).await;

    let (vars_count, events) = store.counts().await.unwrap();
    assert_eq!(vars_count, 3);
    assert_eq!(events, 1, "event row written despite failed emission");

    let rows = store.recent_events(10, None).await.unwrap();
    // emission failed, so the raw source variable is recorded
    assert_eq!(rows[0].source, "CaseTemperature");
    assert_eq!(rows[0].severity, 900);
}
