use thiserror::Error;

use crate::model::{ConfigError, QuestionError, QuestionSetError};

/// Errors raised while loading exam inputs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    QuestionSet(#[from] QuestionSetError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("malformed input: {0}")]
    Json(#[from] serde_json::Error),
}
