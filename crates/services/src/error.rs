//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

use crate::sessions::IntentToken;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session already submitted")]
    Completed,
    #[error("no pending confirmation for token {0}")]
    UnknownIntent(IntentToken),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by a `ResultSink`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultSinkError {
    #[error("result sink rejected the result: {0}")]
    Rejected(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
