//! Error types for Dorm Guide
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Dorm Guide operations
///
/// Covers configuration loading, calls to the recommendation service,
/// session persistence and session lookups. None of these are fatal to an
/// interactive chat; the controller degrades to a safe default instead.
#[derive(Error, Debug)]
pub enum DormGuideError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Recommendation service errors (transport, malformed exchange)
    #[error("Service error: {0}")]
    Service(String),

    /// Recommendation service answered with a non-success status
    #[error("Service returned status {status}: {body}")]
    ServiceStatus {
        /// HTTP status code returned by the service
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Durable storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Session lookup errors (unknown or ambiguous id)
    #[error("Session error: {0}")]
    Session(String),

    /// User input that cannot be acted on
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for Dorm Guide operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = DormGuideError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_service_error_display() {
        let error = DormGuideError::Service("connection refused".to_string());
        assert_eq!(error.to_string(), "Service error: connection refused");
    }

    #[test]
    fn test_service_status_error_display() {
        let error = DormGuideError::ServiceStatus {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(error.to_string(), "Service returned status 503: unavailable");
    }

    #[test]
    fn test_storage_error_display() {
        let error = DormGuideError::Storage("database connection failed".to_string());
        assert_eq!(
            error.to_string(),
            "Storage error: database connection failed"
        );
    }

    #[test]
    fn test_session_error_display() {
        let error = DormGuideError::Session("no session matches 42".to_string());
        assert_eq!(error.to_string(), "Session error: no session matches 42");
    }

    #[test]
    fn test_invalid_input_error_display() {
        let error = DormGuideError::InvalidInput("message is empty".to_string());
        assert_eq!(error.to_string(), "Invalid input: message is empty");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: DormGuideError = json_error.into();
        assert!(matches!(error, DormGuideError::Serialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DormGuideError>();
    }
}
