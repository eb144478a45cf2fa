//! Registry error types.

use std::time::Duration;

use thiserror::Error;

use crate::db::timeouts::TimeoutError;

/// Errors surfaced by the tournament registry store
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A uniqueness, foreign-key or check constraint rejected the write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Input rejected before reaching storage
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Connection or storage failure
    #[error("Database error: {0}")]
    Persistence(sqlx::Error),

    /// Storage did not answer in time
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,
}

impl RegistryError {
    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            RegistryError::Persistence(_) | RegistryError::Timeout(_) => {
                "Internal server error".to_string()
            }
            RegistryError::HashingFailed => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether the error originates from storage rather than from the caller's input
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            RegistryError::Persistence(_) | RegistryError::Timeout(_) | RegistryError::HashingFailed
        )
    }
}

impl From<sqlx::Error> for RegistryError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return RegistryError::ConstraintViolation("duplicate value".to_string());
            }
            if db_err.is_foreign_key_violation() {
                return RegistryError::ConstraintViolation(
                    "referenced record does not exist".to_string(),
                );
            }
            if db_err.is_check_violation() {
                return RegistryError::ConstraintViolation(db_err.message().to_string());
            }
        }
        RegistryError::Persistence(err)
    }
}

impl From<TimeoutError> for RegistryError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => RegistryError::Timeout(duration),
            TimeoutError::Database(e) => e.into(),
        }
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
