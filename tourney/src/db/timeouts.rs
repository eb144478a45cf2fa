//! Database query timeout helpers
//!
//! Provides timeout wrappers for database operations so a stalled storage
//! engine cannot block a request indefinitely.

use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for database queries (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Error type for timeout operations
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError {
    /// Operation timed out
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for timeout operations
pub type TimeoutResult<T> = Result<T, TimeoutError>;

/// Execute a query with timeout
///
/// # Example
///
/// ```no_run
/// use tourney::db::timeouts::{with_timeout, DEFAULT_QUERY_TIMEOUT};
/// # use sqlx::SqlitePool;
/// # async fn example(pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
///
/// let result = with_timeout(
///     DEFAULT_QUERY_TIMEOUT,
///     sqlx::query("SELECT * FROM users WHERE id = ?")
///         .bind(1)
///         .fetch_optional(pool)
/// ).await?;
///
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> TimeoutResult<T>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(duration, future).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(TimeoutError::Database(e)),
        Err(_) => Err(TimeoutError::Timeout(duration)),
    }
}

/// Execute a query with default timeout (5 seconds)
pub async fn with_default_timeout<F, T>(future: F) -> TimeoutResult<T>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    with_timeout(DEFAULT_QUERY_TIMEOUT, future).await
}
