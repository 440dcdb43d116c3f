use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

/// Client-side error taxonomy. Validation failures are raised locally before
/// any network call when detectable; server errors are surfaced verbatim and
/// never retried automatically.
#[derive(Debug, Clone, Error)]
pub enum EditorError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<ApiError> for EditorError {
    fn from(err: ApiError) -> Self {
        match err.code {
            ErrorCode::Validation => EditorError::Validation(err.message),
            ErrorCode::NotFound => EditorError::NotFound(err.message),
            ErrorCode::Internal => EditorError::Transport(err.message),
        }
    }
}

impl From<reqwest::Error> for EditorError {
    fn from(err: reqwest::Error) -> Self {
        EditorError::Transport(err.to_string())
    }
}
