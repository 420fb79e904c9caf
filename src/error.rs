//! # Gateway Error Types
//!
//! Structured error handling for the dispatch gateway. Backend rejections and
//! unreachable peers are not errors: they are folded into outcomes and health
//! snapshots at the component boundary. What remains here are local faults.

use thiserror::Error;

use crate::config::ConfigurationError;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Shutdown in progress")]
    ShutdownInProgress,
}

impl GatewayError {
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type alias for GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_context() {
        let err = GatewayError::persistence("duplicate key");
        assert_eq!(err.to_string(), "Persistence error: duplicate key");

        let err = GatewayError::validation("amount must be positive");
        assert_eq!(err.to_string(), "Validation error: amount must be positive");
    }

    #[test]
    fn test_configuration_error_converts() {
        let err: GatewayError = ConfigurationError::validation("workers.count must be > 0").into();
        assert!(matches!(err, GatewayError::Configuration(_)));
        assert!(err.to_string().contains("workers.count"));
    }
}
