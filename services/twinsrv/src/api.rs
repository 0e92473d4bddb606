//! Browse surface
//!
//! Read-only HTTP view over the mirror tree and the history database.
//! External observers browse the current state here; all mutation goes
//! through the ingestion pipeline.

use crate::config::TwinConfig;
use crate::mirror::MirrorTree;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use scgdi_model::Domain;
use scgdi_store::{EventRecord, HistoryStore, VarRecord};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub mirror: Arc<MirrorTree>,
    pub store: HistoryStore,
    pub info: Value,
}

impl ApiState {
    pub fn new(mirror: Arc<MirrorTree>, store: HistoryStore, config: &TwinConfig) -> Self {
        let info = json!({
            "server_name": config.server_name,
            "namespace_uri": config.namespace_uri,
            "manufacturer": config.build.manufacturer,
            "product_name": config.build.product_name,
            "product_uri": config.build.product_uri,
            "application_uri": config.build.app_uri,
            "software_version": config.build.software_version,
            "build_number": config.build.build_number,
        });
        Self { mirror, store, info }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/info", get(get_info))
        .route("/nodes", get(list_nodes))
        .route("/nodes/{domain}", get(list_domain))
        .route("/nodes/{domain}/{name}", get(read_variable))
        .route("/history/vars", get(recent_vars))
        .route("/history/vars/{name}", get(var_history))
        .route("/history/events", get(recent_events))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    limit: Option<i64>,
    since: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    start: Option<String>,
    end: Option<String>,
    limit: Option<i64>,
}

fn parse_domain(name: &str) -> Result<Domain, (StatusCode, String)> {
    match name {
        "Electrical" => Ok(Domain::Electrical),
        "Environment" => Ok(Domain::Environment),
        "Vibration" => Ok(Domain::Vibration),
        other => Err((StatusCode::NOT_FOUND, format!("Unknown domain: {}", other))),
    }
}

fn store_error(e: scgdi_store::StoreError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

async fn get_info(State(state): State<ApiState>) -> Json<Value> {
    Json(state.info.clone())
}

async fn list_nodes(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({ "nodes": state.mirror.snapshot() }))
}

async fn list_domain(
    State(state): State<ApiState>,
    Path(domain): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let domain = parse_domain(&domain)?;
    Ok(Json(json!({ "nodes": state.mirror.domain_snapshot(domain) })))
}

async fn read_variable(
    State(state): State<ApiState>,
    Path((domain, name)): Path<(String, String)>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let domain = parse_domain(&domain)?;
    match state.mirror.value_of(domain, &name) {
        Some(value) => Ok(Json(json!({
            "path": domain.qualified_path(&name),
            "value": value,
        }))),
        None => Err((StatusCode::NOT_FOUND, format!("Unknown variable: {}", name))),
    }
}

async fn recent_vars(
    State(state): State<ApiState>,
    Query(q): Query<RecentQuery>,
) -> Result<Json<Vec<VarRecord>>, (StatusCode, String)> {
    let rows = state
        .store
        .recent_vars(q.limit.unwrap_or(15), q.since.as_deref())
        .await
        .map_err(store_error)?;
    Ok(Json(rows))
}

async fn var_history(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Query(q): Query<RangeQuery>,
) -> Result<Json<Vec<VarRecord>>, (StatusCode, String)> {
    let rows = state
        .store
        .var_history_for(&name, q.start.as_deref(), q.end.as_deref(), q.limit.unwrap_or(1000))
        .await
        .map_err(store_error)?;
    Ok(Json(rows))
}

async fn recent_events(
    State(state): State<ApiState>,
    Query(q): Query<RecentQuery>,
) -> Result<Json<Vec<EventRecord>>, (StatusCode, String)> {
    let rows = state
        .store
        .recent_events(q.limit.unwrap_or(15), q.since.as_deref())
        .await
        .map_err(store_error)?;
    Ok(Json(rows))
}
