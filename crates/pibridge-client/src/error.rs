//! Error types for provider API calls.
//!
//! A provider answering with a non-2xx status is not an error at this layer;
//! callers inspect [`ProviderResponse`](crate::ProviderResponse) and decide.
//! The variants here cover failures to obtain or understand a response at all.

use thiserror::Error;

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures talking to the provider.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Connection, TLS, or body transfer failure.
    #[error("network request failed: {message}")]
    NetworkError {
        /// Error message describing the network failure
        message: String,
    },

    /// The configured provider timeout elapsed.
    #[error("request timeout after {timeout_seconds}s")]
    Timeout {
        /// Configured timeout in seconds
        timeout_seconds: u64,
    },

    /// The provider answered with a body of an unexpected shape.
    #[error("invalid provider response: {message}")]
    InvalidResponse {
        /// What could not be understood
        message: String,
    },

    /// The client could not be built or an endpoint URL could not be formed.
    #[error("invalid client configuration: {message}")]
    ConfigurationError {
        /// Configuration error message
        message: String,
    },
}

impl ClientError {
    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse { message: message.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_format() {
        assert_eq!(ClientError::timeout(30).to_string(), "request timeout after 30s");
        assert_eq!(
            ClientError::network("connection refused").to_string(),
            "network request failed: connection refused"
        );
        assert_eq!(
            ClientError::invalid_response("expected value at line 1 column 1").to_string(),
            "invalid provider response: expected value at line 1 column 1"
        );
    }
}
