//! Model error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    /// Message body is not valid JSON
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Body parsed but does not match the canonical shape for the domain
    #[error("Payload does not match {domain} schema: {reason}")]
    InvalidShape { domain: &'static str, reason: String },
}
