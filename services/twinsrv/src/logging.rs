//! Logging initialization

use crate::error::{Result, TwinSrvError};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber with the given level.
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| TwinSrvError::Config(format!("Invalid log level '{}': {}", level, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| TwinSrvError::Config(format!("Logging init failed: {}", e)))?;

    Ok(())
}
