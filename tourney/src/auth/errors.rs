//! Authentication error types.

use thiserror::Error;

use crate::db::timeouts::TimeoutError;
use crate::registry::{RegistryError, Role};

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Underlying registry failure
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Unknown username, wrong password or wrong role
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// JWT token error
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// Session expired
    #[error("Session expired")]
    SessionExpired,

    /// Invalid refresh token
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Authenticated, but not allowed to perform the operation
    #[error("Forbidden: {required} role required")]
    Forbidden { required: Role },
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Storage and JWT errors are sanitized to prevent information disclosure
    /// about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Registry(e) => e.client_message(),
            AuthError::JwtError(_) => "Authentication failed".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Registry(err.into())
    }
}

impl From<TimeoutError> for AuthError {
    fn from(err: TimeoutError) -> Self {
        AuthError::Registry(err.into())
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
