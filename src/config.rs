//! # Configuration Management
//!
//! Centralized configuration for collectors and submitters.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Environment variables via `from_env()` (`NSCA_*`)
//! - Direct instantiation with defaults
//!
//! The shared secret lives here: it is static, process-wide, read-only
//! configuration, unlike the per-connection IV key which the receiving side
//! generates fresh on every accept.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default NSCA collector port.
pub const DEFAULT_PORT: u16 = 5667;

/// Top-level configuration for both sides of the protocol.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NscaConfig {
    /// Receiving-side settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Submitting-side settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Shared secret for the second cipher layer. Empty means the secret
    /// layer degenerates to the identity transform.
    #[serde(default)]
    pub secret: String,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NscaConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("NSCA_SERVER_ADDRESS") {
            config.server.address = addr;
        }

        if let Ok(addr) = std::env::var("NSCA_CLIENT_ADDRESS") {
            config.client.address = addr;
        }

        if let Ok(secret) = std::env::var("NSCA_SECRET") {
            config.secret = secret;
        }

        if let Ok(level) = std::env::var("NSCA_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# failed to generate example config"))
    }

    /// Validate the configuration for common misconfigurations.
    ///
    /// Returns a list of validation errors; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.server.validate());
        errors.extend(self.client.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Receiving-side configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Listen address, e.g. `0.0.0.0:5667`
    #[serde(default = "default_server_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_server_address(),
        }
    }
}

impl ServerConfig {
    fn validate(&self) -> Vec<String> {
        validate_address("server.address", &self.address)
    }
}

/// Submitting-side configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Collector address to submit to, e.g. `monitoring.example.net:5667`
    #[serde(default = "default_client_address")]
    pub address: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: default_client_address(),
        }
    }
}

impl ClientConfig {
    fn validate(&self) -> Vec<String> {
        validate_address("client.address", &self.address)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter: trace, debug, info, warn, or error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Vec<String> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Vec::new(),
            other => vec![format!("logging.level: unknown level '{other}'")],
        }
    }
}

fn default_server_address() -> String {
    format!("0.0.0.0:{DEFAULT_PORT}")
}

fn default_client_address() -> String {
    format!("127.0.0.1:{DEFAULT_PORT}")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn validate_address(key: &str, address: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if address.is_empty() {
        errors.push(format!("{key}: address must not be empty"));
    } else if !address.contains(':') {
        errors.push(format!("{key}: address '{address}' is missing a port"));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = NscaConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.server.address, "0.0.0.0:5667");
        assert!(config.secret.is_empty());
    }

    #[test]
    fn parses_partial_toml() {
        let config = NscaConfig::from_toml(
            r#"
            secret = "pw"

            [client]
            address = "collector.internal:5667"
            "#,
        )
        .unwrap();

        assert_eq!(config.secret, "pw");
        assert_eq!(config.client.address, "collector.internal:5667");
        // Untouched sections keep their defaults.
        assert_eq!(config.server.address, "0.0.0.0:5667");
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            NscaConfig::from_toml("secret = ["),
            Err(ProtocolError::ConfigError(_))
        ));
    }

    #[test]
    fn validation_catches_missing_port() {
        let config = NscaConfig::default_with_overrides(|c| {
            c.server.address = "0.0.0.0".to_string();
        });
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("missing a port"));
        assert!(config.validate_strict().is_err());
    }

    #[test]
    fn validation_catches_bad_log_level() {
        let config = NscaConfig::default_with_overrides(|c| {
            c.logging.level = "loud".to_string();
        });
        assert!(!config.validate().is_empty());
    }

    #[test]
    fn example_config_round_trips() {
        let example = NscaConfig::example_config();
        let parsed = NscaConfig::from_toml(&example).unwrap();
        assert!(parsed.validate().is_empty());
    }
}
