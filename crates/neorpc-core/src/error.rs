//! Transport-level and service-level error types.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while a protocol client performs a network call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, DNS, broken body, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if this error is transient (the next round may succeed).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Other(_) => false,
        }
    }
}

/// Errors surfaced to callers of a service method.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The call was misconfigured (missing method, URL, ...). Raised
    /// synchronously, before anything is dispatched.
    #[error("configuration error: {0}")]
    Config(String),

    /// The protocol client rejected the call.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response arrived but the service reported an error in its body.
    #[error("service rejected request: {0}")]
    Rejected(Value),

    /// The producing side went away without settling the future.
    #[error("request abandoned before it settled")]
    Abandoned,
}

impl ServiceError {
    /// Returns `true` for errors that halt polling.
    pub fn is_semantic(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}
