//! Credential store error types

use thiserror::Error;

/// Result type alias for store operations
pub type DbResult<T> = Result<T, DbError>;

/// Credential store errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Connection-level failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// A record with the same unique key already exists
    #[error("{0}")]
    Duplicate(String),

    /// Record not found
    #[error("{0}")]
    NotFound(String),

    /// A stored value could not be decoded into a domain type
    #[error("Decode error: {0}")]
    Decode(String),

    /// Migration failure
    #[error("Migration error: {0}")]
    Migration(String),

    /// Underlying query error
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}
