//! Error types for configuration loading

use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// KEYPACT_CONTEXT is not a valid 32-byte hex string
    #[error("invalid context id: {0}")]
    InvalidContextId(String),

    /// KEYPACT_LOG_LEVEL names an unknown level
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidLogLevel("loud".to_string());
        assert_eq!(format!("{}", err), "invalid log level: loud");
    }
}
