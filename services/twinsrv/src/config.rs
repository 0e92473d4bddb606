//! twinsrv configuration
//!
//! Layered with figment: built-in defaults, then an optional YAML file,
//! then `SCGDI_*` environment variables (double underscore for nesting,
//! e.g. `SCGDI_MQTT__HOST`). Every key has a default so the service
//! starts with no configuration at all.

use crate::error::Result;
use crate::net::split_endpoint;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use scgdi_rules::Thresholds;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// MQTT broker connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    #[serde(default = "default_mqtt_host")]
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_mqtt_client_id")]
    pub client_id: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: default_mqtt_host(),
            port: default_mqtt_port(),
            username: None,
            password: None,
            client_id: default_mqtt_client_id(),
        }
    }
}

/// Server identity / build metadata exposed on the browse surface
/// and sent to the discovery service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInfo {
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,
    #[serde(default = "default_product_name")]
    pub product_name: String,
    #[serde(default = "default_product_uri")]
    pub product_uri: String,
    #[serde(default = "default_app_uri")]
    pub app_uri: String,
    #[serde(default = "default_software_version")]
    pub software_version: String,
    #[serde(default = "default_build_number")]
    pub build_number: String,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            manufacturer: default_manufacturer(),
            product_name: default_product_name(),
            product_uri: default_product_uri(),
            app_uri: default_app_uri(),
            software_version: default_software_version(),
            build_number: default_build_number(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwinConfig {
    /// Listen endpoint as `host:port/path`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_server_name")]
    pub server_name: String,
    #[serde(default = "default_namespace_uri")]
    pub namespace_uri: String,
    /// History database file
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Optional discovery-service endpoint; registration is best-effort
    #[serde(default)]
    pub discovery_endpoint: Option<String>,
    #[serde(default)]
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub build: BuildInfo,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TwinConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            server_name: default_server_name(),
            namespace_uri: default_namespace_uri(),
            db_path: default_db_path(),
            discovery_endpoint: None,
            mqtt: MqttConfig::default(),
            build: BuildInfo::default(),
            thresholds: Thresholds::default(),
            log_level: default_log_level(),
        }
    }
}

impl TwinConfig {
    /// Load configuration: defaults, then the YAML file (if present),
    /// then `SCGDI_*` environment variables
    pub fn load<P: AsRef<Path>>(config_file: P) -> Result<Self> {
        let config: TwinConfig = Figment::from(Serialized::defaults(TwinConfig::default()))
            .merge(Yaml::file(config_file))
            .merge(Env::prefixed("SCGDI_").split("__"))
            .extract()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Fails on an unparseable endpoint; everything else has defaults
        split_endpoint(&self.endpoint)?;
        Ok(())
    }
}

fn default_endpoint() -> String {
    "0.0.0.0:4840/scgdi/motor50cv".to_string()
}

fn default_server_name() -> String {
    "SCGDI Motor50CV Server".to_string()
}

fn default_namespace_uri() -> String {
    "http://scgdi.local/motor50cv".to_string()
}

fn default_db_path() -> String {
    "./scgdi_history.sqlite".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_mqtt_host() -> String {
    "localhost".to_string()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_mqtt_client_id() -> String {
    "scgdi-motor50cv".to_string()
}

fn default_manufacturer() -> String {
    "Juliana LTDA".to_string()
}

fn default_product_name() -> String {
    "jbl-twin-server".to_string()
}

fn default_product_uri() -> String {
    "http://jbl.local/twin".to_string()
}

fn default_app_uri() -> String {
    "urn:juliana:twin-server".to_string()
}

fn default_software_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_build_number() -> String {
    "1".to_string()
}
