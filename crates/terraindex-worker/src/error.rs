//! Error types for task handling and range orchestration.

use terraindex_client::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Joined messages of every failed sub-fetch of one range.
    #[error("{0}")]
    Range(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("sink error: {0}")]
    Sink(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// A spawned pipeline stage panicked or was aborted.
    #[error("task failed: {0}")]
    Task(String),
}

impl From<envy::Error> for WorkerError {
    fn from(e: envy::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// `"<prefix>: - a , b , "`, the single message a failed range reports.
pub(crate) fn join_errors(prefix: &str, errors: &[String]) -> String {
    let mut message = format!("{prefix}: - ");
    for error in errors {
        message.push_str(error);
        message.push_str(" , ");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_every_message() {
        let msg = join_errors("Errors Getting Blocks", &["a".into(), "b".into()]);
        assert_eq!(msg, "Errors Getting Blocks: - a , b , ");
    }

    #[test]
    fn client_error_is_transparent() {
        let err = WorkerError::from(ClientError::Cancelled);
        assert_eq!(err.to_string(), ClientError::Cancelled.to_string());
    }
}
