//! twinsrv error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TwinSrvError>;

#[derive(Debug, Error)]
pub enum TwinSrvError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// History store errors
    #[error("Storage error: {0}")]
    Store(#[from] scgdi_store::StoreError),

    /// Address-space mirror errors
    #[error("Mirror error: {0}")]
    Mirror(#[from] crate::mirror::MirrorError),

    /// MQTT transport errors
    #[error("MQTT error: {0}")]
    Mqtt(String),

    /// Endpoint bind errors (after port fallback was exhausted)
    #[error("Bind error: {0}")]
    Bind(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rumqttc::ClientError> for TwinSrvError {
    fn from(err: rumqttc::ClientError) -> Self {
        TwinSrvError::Mqtt(err.to_string())
    }
}

impl From<figment::Error> for TwinSrvError {
    fn from(err: figment::Error) -> Self {
        TwinSrvError::Config(err.to_string())
    }
}
