//! Error taxonomy for the gateway.
//!
//! - [`TransportError`]: the bus is unreachable or a bus operation failed.
//!   Fatal at startup, retried by the transport at runtime.
//! - [`ApiError`]: a call to the external contact-messaging API failed.
//!   Rate limits are a distinct variant carrying the server-suggested
//!   retry-after duration.
//! - [`HandlerFailure`]: the `{message, name}` body placed in a failure
//!   envelope when a registered handler fails.

use std::time::Duration;

use thiserror::Error;

/// Errors from the bus transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not establish or maintain a connection.
    #[error("bus connection error: {0}")]
    Connection(String),

    /// A request did not receive a reply within the timeout.
    #[error("bus request timed out after {0:?}")]
    Timeout(Duration),

    /// A subscribe/publish/request operation failed.
    #[error("bus operation failed: {0}")]
    Operation(String),

    /// The connection is draining; no new messages are accepted.
    #[error("bus connection is draining")]
    Draining,
}

/// Errors from the external contact-messaging API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API signalled throttling; retry after the given duration.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// The API returned a non-success status.
    #[error("upstream API error: HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Network-level failure, including request timeouts.
    #[error("upstream API transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("upstream API decode error: {0}")]
    Decode(String),

    /// The request was invalid before it was sent (e.g. a malformed
    /// contact identifier).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// The `{message, name}` failure body of a failure envelope.
///
/// `name` identifies the failure class ("Error", "DecodeError",
/// "RateLimitError", ...); `message` is the human-readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub name: String,
    pub message: String,
}

impl HandlerFailure {
    /// Create a failure with an explicit class name.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a generic failure (`name: "Error"`).
    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }
}

impl std::fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl From<ApiError> for HandlerFailure {
    fn from(err: ApiError) -> Self {
        let name = match &err {
            ApiError::RateLimited { .. } => "RateLimitError",
            ApiError::InvalidRequest(_) => "ValidationError",
            _ => "UpstreamApiError",
        };
        Self::new(name, err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        let err = TransportError::Timeout(Duration::from_secs(10));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn api_error_rate_limited_display() {
        let err = ApiError::RateLimited {
            retry_after: Duration::from_secs(2),
        };
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn handler_failure_from_api_error_names_rate_limit() {
        let failure: HandlerFailure = ApiError::RateLimited {
            retry_after: Duration::from_secs(1),
        }
        .into();
        assert_eq!(failure.name, "RateLimitError");
    }

    #[test]
    fn handler_failure_from_status_is_upstream() {
        let failure: HandlerFailure = ApiError::Status {
            status: 500,
            body: "oops".to_string(),
        }
        .into();
        assert_eq!(failure.name, "UpstreamApiError");
        assert!(failure.message.contains("500"));
    }

    #[test]
    fn handler_failure_error_uses_generic_name() {
        let failure = HandlerFailure::error("boom");
        assert_eq!(failure.name, "Error");
        assert_eq!(failure.message, "boom");
    }
}
