//! Client-level error types.

use thiserror::Error;

/// Errors that can occur while talking to the node.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection-level failure (refused, reset, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Non-success HTTP status; `body` holds the decoded error text when the
    /// node returned a structured error body.
    #[error("Bad Response {status} ({body})")]
    Status { status: u16, body: String },

    /// Explicit error body returned by the node with a success status.
    #[error("RPC error {code}: {message}")]
    Protocol { code: i64, message: String },

    /// The caller's deadline passed before the request could complete.
    #[error("request cancelled: deadline exceeded")]
    Cancelled,

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Response parsed but carried unusable data.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Returns `true` for transient failures: network errors, timeouts and
    /// 5xx responses.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the node answered with an explicit error.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol { .. })
            || matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }
}
