//! Configuration management for KeyPact
//!
//! Environment-based configuration with defaults. Outer surfaces (the CLI)
//! may override individual values with their own flags.

use crate::core_registry::address::ContextId;
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Execution context configuration
    pub context: ContextConfig,

    /// State storage configuration
    pub state: StateConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Execution context configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Context identifier scoping signatures to this deployment instance
    pub context_id: ContextId,
}

/// State storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Base directory for registry state and keys
    pub data_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level
    pub level: String,

    /// Whether to emit JSON formatted logs
    pub json_format: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            context: ContextConfig {
                // stand-in for local development; real deployments set
                // KEYPACT_CONTEXT to their own instance id
                context_id: ContextId::derive(b"keypact-dev"),
            },
            state: StateConfig {
                data_dir: PathBuf::from("./keypact-data"),
            },
            logging: LoggingConfig {
                level: LogLevel::Info.as_str().to_string(),
                json_format: false,
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognized variables: `KEYPACT_CONTEXT` (64 hex chars),
    /// `KEYPACT_DATA_DIR`, `KEYPACT_LOG_LEVEL`, `KEYPACT_LOG_JSON`.
    pub fn from_env() -> Result<Config, ConfigError> {
        let mut config = Config::default();

        if let Ok(raw) = env::var("KEYPACT_CONTEXT") {
            config.context.context_id =
                ContextId::from_hex(&raw).map_err(ConfigError::InvalidContextId)?;
        }
        if let Ok(raw) = env::var("KEYPACT_DATA_DIR") {
            config.state.data_dir = PathBuf::from(raw);
        }
        if let Ok(raw) = env::var("KEYPACT_LOG_LEVEL") {
            if LogLevel::from_str(&raw).is_none() {
                return Err(ConfigError::InvalidLogLevel(raw));
            }
            config.logging.level = raw;
        }
        if let Ok(raw) = env::var("KEYPACT_LOG_JSON") {
            config.logging.json_format = raw == "1" || raw.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.state.data_dir, PathBuf::from("./keypact-data"));
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        // default context is the derived dev context
        assert_eq!(
            config.context.context_id,
            ContextId::derive(b"keypact-dev")
        );
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.context.context_id, config.context.context_id);
        assert_eq!(back.state.data_dir, config.state.data_dir);
    }
}
