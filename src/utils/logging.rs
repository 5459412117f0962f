//! Structured logging setup.
//!
//! Thin wrapper over `tracing-subscriber` driven by
//! [`LoggingConfig`](crate::config::LoggingConfig). `RUST_LOG` takes
//! precedence over the configured level when set.

use crate::config::LoggingConfig;
use crate::error::{ProtocolError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nsca_protocol={}", config.level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| ProtocolError::ConfigError(format!("failed to install subscriber: {e}")))
}
