//! Database configuration module.
//!
//! Provides configuration structures for database connection management.

use std::env;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL (`sqlite://path/to/file.db` or `sqlite::memory:`)
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `DATABASE_URL`: SQLite connection string (default: `sqlite://tourney.db`)
    /// - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 5)
    /// - `DB_MIN_CONNECTIONS`: Minimum pool size (default: 1)
    /// - `DB_CONNECTION_TIMEOUT`: Connection timeout in seconds (default: 10)
    /// - `DB_IDLE_TIMEOUT`: Idle timeout in seconds (default: 600)
    /// - `DB_MAX_LIFETIME`: Max lifetime in seconds (default: 1800)
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::development();
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", defaults.min_connections),
            connection_timeout_secs: parse_env_or(
                "DB_CONNECTION_TIMEOUT",
                defaults.connection_timeout_secs,
            ),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT", defaults.idle_timeout_secs),
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME", defaults.max_lifetime_secs),
        }
    }

    /// Create a default configuration for development
    ///
    /// Uses `sqlite://tourney.db` in the working directory.
    pub fn development() -> Self {
        Self {
            database_url: "sqlite://tourney.db".to_string(),
            max_connections: 5,
            min_connections: 1,
            connection_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }

    /// Configuration for a private in-memory database.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connection_timeout_secs: 5,
            idle_timeout_secs: 0,
            max_lifetime_secs: 0,
        }
    }

    /// Whether this configuration points at an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}

fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
