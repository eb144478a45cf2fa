//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{AccessTokenClaims, LoginRequest, RegisterRequest, Session, SessionTokens},
};
use crate::db::timeouts::with_default_timeout;
use crate::registry::{RegistryStore, User, UserId};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

/// Authentication manager
///
/// Credentials are checked through the registry; sessions are a short-lived
/// signed access token plus a rotating refresh token persisted in `sessions`.
#[derive(Clone)]
pub struct AuthManager {
    registry: Arc<dyn RegistryStore>,
    pool: SqlitePool,
    jwt_secret: String,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `registry` - Store holding the user accounts
    /// * `pool` - Database connection pool for refresh sessions
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(registry: Arc<dyn RegistryStore>, pool: SqlitePool, jwt_secret: String) -> Self {
        Self {
            registry,
            pool,
            jwt_secret,
            access_token_duration: Duration::minutes(15),
            refresh_token_duration: Duration::days(7),
        }
    }

    /// Override the access and refresh token lifetimes
    pub fn with_token_durations(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_token_duration = access;
        self.refresh_token_duration = refresh;
        self
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// * `RegistryError::ConstraintViolation` - Username already exists
    /// * `RegistryError::Validation` - Empty username or admin affiliation
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        let user_id = self
            .registry
            .register_user(
                &request.username,
                &request.password,
                request.role,
                request.college.as_deref(),
            )
            .await?;

        self.registry
            .find_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Login a user
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown user, wrong password or wrong role
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, SessionTokens)> {
        let user = self
            .registry
            .authenticate(&request.username, &request.password, request.role)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let tokens = self.create_session(&user).await?;
        Ok((user, tokens))
    }

    /// Create a new session with access and refresh tokens
    async fn create_session(&self, user: &User) -> AuthResult<SessionTokens> {
        let access_token = self.generate_access_token(user)?;
        let refresh_token = Uuid::new_v4().to_string();

        let now = Utc::now();
        with_default_timeout(
            sqlx::query(
                "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&refresh_token)
            .bind(user.id)
            .bind(now)
            .bind(now + self.refresh_token_duration)
            .execute(&self.pool),
        )
        .await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Refresh access token using refresh token
    ///
    /// The presented refresh token is consumed and replaced. Consumption is a
    /// single `DELETE ... RETURNING`, so a token is redeemable at most once
    /// even under concurrent requests.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidRefreshToken` - Refresh token not found or already used
    /// * `AuthError::SessionExpired` - Refresh token expired
    pub async fn refresh_token(&self, refresh_token: &str) -> AuthResult<SessionTokens> {
        let session_row = with_default_timeout(
            sqlx::query("DELETE FROM sessions WHERE token = ? RETURNING user_id, expires_at")
                .bind(refresh_token)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(AuthError::InvalidRefreshToken)?;

        let expires_at: DateTime<Utc> = session_row.try_get("expires_at")?;
        if expires_at < Utc::now() {
            return Err(AuthError::SessionExpired);
        }

        let user_id: UserId = session_row.try_get("user_id")?;
        let user = self
            .registry
            .find_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.create_session(&user).await
    }

    /// Logout by invalidating one of the caller's refresh tokens
    ///
    /// Tokens belonging to another user are left untouched.
    pub async fn logout(&self, user_id: UserId, refresh_token: &str) -> AuthResult<()> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM sessions WHERE token = ? AND user_id = ?")
                .bind(refresh_token)
                .bind(user_id)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            log::debug!("Logout by user {} matched no session", user_id);
        }
        Ok(())
    }

    /// Drop every refresh session past its expiry. Returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> AuthResult<u64> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM sessions WHERE julianday(expires_at) < julianday(?)")
                .bind(Utc::now())
                .execute(&self.pool),
        )
        .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            log::info!("Purged {} expired session(s)", purged);
        }
        Ok(purged)
    }

    /// Verify an access token and turn it into the caller's session
    pub fn verify_access_token(&self, token: &str) -> AuthResult<Session> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims.into())
    }

    /// Generate JWT access token
    fn generate_access_token(&self, user: &User) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            exp: (now + self.access_token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }
}
