//! Error types for the service layer and storage backends.
//!
//! The service surfaces three kinds of failures to callers: malformed input,
//! missing records, and business-rule violations. Backend failures from the
//! store pass through unchanged; nothing is retried or recovered locally.

use thiserror::Error;

/// Errors returned by [`TaskService`](crate::service::TaskService) operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Malformed input (empty title, unrecognized status value).
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced user or task does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A status transition violates the terminal-state rule.
    #[error("business rule violation: {0}")]
    BusinessRule(String),

    /// The storage backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be decoded back into the data model.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("background task failed: {0}")]
    Join(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::FromSqlConversionFailure(..) => StoreError::Corrupt(e.to_string()),
            _ => StoreError::Database(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::Join(e.to_string())
    }
}
