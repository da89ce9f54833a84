use rusqlite::ffi::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("domain invariant violated: {0}")]
    Domain(String),
    #[error("leaderboard busy: {0}")]
    Busy(String),
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl EngineError {
    /// Whether the caller may retry the whole operation.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Busy(_) => true,
            EngineError::Store(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}
