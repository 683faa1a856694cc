//! Store and execution error types.

use thiserror::Error;

/// Errors raised by a `DataStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("unexpected result shape: {0}")]
    Shape(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Connection(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Why the safe executor refused or failed to return rows.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("query rejected: {}", .reasons.join("; "))]
    Rejected { reasons: Vec<String> },

    #[error("query rejected: sanitized statement is not a SELECT")]
    NotSelect,

    /// Store failure. The underlying error is logged, never carried.
    #[error("failed to execute query")]
    Store,
}

/// Convenience alias for executor results.
pub type ExecutionOutcome<T> = Result<T, ExecutionError>;
