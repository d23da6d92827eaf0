//! Database error types.

use thiserror::Error;

/// Database errors
#[derive(Debug, Error)]
pub enum DbError {
    /// The server could not be reached or rejected the handshake
    #[error("Database connection failed: {0}")]
    ConnectionFailure(String),

    /// A query or command failed after the connection was established
    #[error("Database query failed: {0}")]
    Query(#[from] mongodb::error::Error),

    /// A stored document does not have the expected shape
    #[error("Malformed document in {collection}: {reason}")]
    Malformed {
        collection: &'static str,
        reason: String,
    },
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;
