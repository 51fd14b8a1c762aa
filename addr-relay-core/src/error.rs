//! Error types for the relay.
//!
//! One `thiserror` enum covers every failure the relay can produce. Upstream
//! failures are recoverable and never reach dashboard clients; configuration
//! and I/O failures only happen at startup.

use thiserror::Error;

/// Result type alias using `RelayError`.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Main error type for all relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP transport failed (DNS, connect, TLS, reset).
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Upstream did not answer within the configured timeout.
    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    /// Upstream answered with a non-success status.
    #[error("Upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Upstream body was not the expected `{ data: { count } }` shape.
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // STARTUP ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error (bind, accept).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RelayError {
    /// Returns true if the next poll cycle may succeed where this one failed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RelayError::HttpError(_)
                | RelayError::ConnectionTimeout(_)
                | RelayError::UpstreamStatus { .. }
                | RelayError::MalformedResponse(_)
                | RelayError::JsonError(_)
        )
    }

    /// Returns true if this error came from talking to the upstream explorer.
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            RelayError::HttpError(_)
                | RelayError::ConnectionTimeout(_)
                | RelayError::UpstreamStatus { .. }
                | RelayError::MalformedResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelayError::UpstreamStatus {
            status: 429,
            body: "rate limited".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_error_classification() {
        assert!(RelayError::HttpError("test".into()).is_recoverable());
        assert!(RelayError::ConnectionTimeout("test".into()).is_recoverable());
        assert!(RelayError::MalformedResponse("test".into()).is_recoverable());
        assert!(!RelayError::ConfigError("test".into()).is_recoverable());

        assert!(RelayError::HttpError("test".into()).is_upstream_error());
        assert!(!RelayError::ConfigError("test".into()).is_upstream_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let relay_result: Result<serde_json::Value> = json_result.map_err(RelayError::from);
        assert!(matches!(relay_result, Err(RelayError::JsonError(_))));
    }
}
