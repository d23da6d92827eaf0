//! Authentication error types.

use thiserror::Error;

use crate::db::DbError;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password.
    ///
    /// Both cases share this variant so callers cannot tell which one occurred.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Token signature, issuer, expiry or structure did not check out
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Token could not be signed
    #[error("Token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database and signing errors are sanitized to prevent information
    /// disclosure about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) | AuthError::Signing(_) | AuthError::HashingFailed => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
