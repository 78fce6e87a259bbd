//! Centralized error types for Fila.

use fila_db::DbError;
use thiserror::Error;

/// Main error type for Fila operations.
#[derive(Error, Debug)]
pub enum FilaError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ticket already called: {0}")]
    AlreadyCalled(String),

    #[error("Connection not identified: {0}")]
    Unidentified(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for Fila operations.
pub type FilaResult<T> = Result<T, FilaError>;

impl FilaError {
    /// Create an invalid input error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Stable wire name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::AlreadyCalled(_) => "already_called",
            Self::Unidentified(_) => "unidentified",
            Self::Unavailable(_) => "unavailable",
            Self::Config(_) => "config",
            Self::Io(_) | Self::Json(_) | Self::Internal(_) => "internal",
        }
    }

    /// Whether retrying the same request later can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<DbError> for FilaError {
    fn from(err: DbError) -> Self {
        if err.is_transient() {
            return Self::Unavailable(err.to_string());
        }
        match err {
            DbError::NotFound(msg) => Self::NotFound(msg),
            DbError::Conflict(msg) => Self::AlreadyCalled(msg),
            DbError::Forbidden(msg) => Self::Forbidden(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_kinds() {
        let err: FilaError = DbError::Conflict("t".into()).into();
        assert_eq!(err.kind(), "already_called");

        let err: FilaError = DbError::PoolExhausted.into();
        assert_eq!(err.kind(), "unavailable");
        assert!(err.is_retryable());

        let err: FilaError = DbError::Forbidden("t".into()).into();
        assert_eq!(err.kind(), "forbidden");
        assert!(!err.is_retryable());

        let err: FilaError = DbError::Migration("boom".into()).into();
        assert_eq!(err.kind(), "internal");
    }
}
