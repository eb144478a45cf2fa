//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tourney::db::DatabaseConfig;

const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 6969);

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Credential hashing cost
    pub hashing: HashingConfig,
    /// Token lifetimes
    pub sessions: SessionConfig,
}

/// Security-related configuration
#[derive(Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Password hashing pepper (required)
    pub password_pepper: String,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Access and refresh token lifetimes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_token_minutes: 15,
            refresh_token_days: 7,
        }
    }
}

impl SessionConfig {
    pub fn access_token_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_token_minutes)
    }

    pub fn refresh_token_duration(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_token_days)
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{raw}' is not an IP:PORT address"),
                })?,
                Err(_) => DEFAULT_BIND,
            },
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        // Security configuration (REQUIRED)
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let password_pepper =
            std::env::var("PASSWORD_PEPPER").map_err(|_| ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        let hashing_defaults = HashingConfig::default();
        let hashing = HashingConfig {
            memory_kib: parse_env_or("ARGON2_MEMORY_KIB", hashing_defaults.memory_kib),
            iterations: parse_env_or("ARGON2_ITERATIONS", hashing_defaults.iterations),
            parallelism: parse_env_or("ARGON2_PARALLELISM", hashing_defaults.parallelism),
        };

        let session_defaults = SessionConfig::default();
        let sessions = SessionConfig {
            access_token_minutes: parse_env_or(
                "ACCESS_TOKEN_MINUTES",
                session_defaults.access_token_minutes,
            ),
            refresh_token_days: parse_env_or(
                "REFRESH_TOKEN_DAYS",
                session_defaults.refresh_token_days,
            ),
        };

        let config = ServerConfig {
            bind,
            database,
            security: SecurityConfig {
                jwt_secret,
                password_pepper,
            },
            hashing,
            sessions,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if self.security.password_pepper.len() < 16 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        if self.hashing.iterations == 0 {
            return Err(ConfigError::Invalid {
                var: "ARGON2_ITERATIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.hashing.parallelism == 0 {
            return Err(ConfigError::Invalid {
                var: "ARGON2_PARALLELISM".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        // Argon2 needs at least 8 KiB per lane
        if self.hashing.memory_kib < 8 * self.hashing.parallelism {
            return Err(ConfigError::Invalid {
                var: "ARGON2_MEMORY_KIB".to_string(),
                reason: format!(
                    "Must be at least {} for {} lane(s)",
                    8 * self.hashing.parallelism,
                    self.hashing.parallelism
                ),
            });
        }

        if self.sessions.access_token_minutes <= 0 {
            return Err(ConfigError::Invalid {
                var: "ACCESS_TOKEN_MINUTES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.sessions.refresh_token_days <= 0 {
            return Err(ConfigError::Invalid {
                var: "REFRESH_TOKEN_DAYS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
