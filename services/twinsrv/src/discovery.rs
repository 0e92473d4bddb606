//! Best-effort discovery-service registration
//!
//! Many deployments have no discovery service; registration failures
//! are logged and never abort startup.

use crate::config::TwinConfig;
use serde_json::json;
use tracing::{info, warn};

pub async fn try_register(config: &TwinConfig, endpoint: &str) {
    let Some(discovery) = &config.discovery_endpoint else {
        info!("Discovery: endpoint not configured, skipping registration");
        return;
    };

    let body = json!({
        "endpoint": endpoint,
        "server_name": config.server_name,
        "application_uri": config.build.app_uri,
        "product_uri": config.build.product_uri,
        "software_version": config.build.software_version,
    });

    match reqwest::Client::new().post(discovery).json(&body).send().await {
        Ok(resp) if resp.status().is_success() => {
            info!("Discovery: registered at {}", discovery);
        }
        Ok(resp) => {
            warn!("Discovery: registration rejected by {}: {}", discovery, resp.status());
        }
        Err(e) => {
            warn!("Discovery: registration failed: {}", e);
        }
    }
}
