//! Authentication API handlers.
//!
//! - User registration as player or admin, followed by an automatic login
//! - Login with username/password and an optional role
//! - Logout to invalidate refresh tokens
//! - Token refresh for obtaining new access tokens
//!
//! # Examples
//!
//! Register a new player:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "player1", "password": "Pass123!", "role": "player", "college": "MIT"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "player1", "password": "Pass123!"}'
//! ```

use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tourney::{
    AuthError, Role, Session, User,
    auth::{LoginRequest, RegisterRequest, SessionTokens},
};

use super::{
    AppState,
    errors::{ApiError, auth_error},
};
use crate::logging::log_security_event;

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub college: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl AuthResponse {
    fn new(user: &User, tokens: SessionTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Register a new user account and automatically log them in.
///
/// # Request Body
///
/// ```json
/// {
///   "username": "player123",
///   "password": "SecurePass123!",
///   "role": "player",
///   "college": "MIT"  // Optional, players only
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Empty username, or a college on an admin account
/// - `409 Conflict`: Username already taken
/// - `500 Internal Server Error`: Server error during registration or login
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    let request = RegisterRequest {
        username: payload.username.clone(),
        password: payload.password.clone(),
        role: payload.role,
        college: payload.college,
    };

    let user = state.auth_manager.register(request).await.map_err(auth_error)?;

    let login_request = LoginRequest {
        username: payload.username,
        password: payload.password,
        role: Some(user.role),
    };

    let (user, tokens) = state
        .auth_manager
        .login(login_request)
        .await
        .map_err(auth_error)?;

    Ok(Json(AuthResponse::new(&user, tokens)))
}

/// Authenticate a user and generate session tokens.
///
/// When `role` is given the account must hold that role, otherwise the
/// attempt fails exactly like a wrong password.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    let request = LoginRequest {
        username: payload.username.clone(),
        password: payload.password,
        role: payload.role,
    };

    match state.auth_manager.login(request).await {
        Ok((user, tokens)) => Ok(Json(AuthResponse::new(&user, tokens))),
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials) {
                log_security_event("failed_login", Some(&payload.username), "Invalid credentials");
            }
            Err(auth_error(e))
        }
    }
}

/// Logout and invalidate the given refresh token.
///
/// Only the caller's own refresh tokens are revoked. The access token keeps
/// working until it expires.
///
/// # Request Body
///
/// ```json
/// "3f1c2a9e-..."  // Refresh token string
/// ```
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(refresh_token): Json<String>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_manager
        .logout(session.user_id, &refresh_token)
        .await
        .map_err(auth_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Exchange a refresh token for a new access/refresh token pair.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired, or revoked refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(old_refresh_token): Json<String>,
) -> Result<Json<AuthResponse>, ApiError> {
    let tokens = state
        .auth_manager
        .refresh_token(&old_refresh_token)
        .await
        .map_err(auth_error)?;

    let session = state
        .auth_manager
        .verify_access_token(&tokens.access_token)
        .map_err(auth_error)?;

    Ok(Json(AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user_id: session.user_id,
        username: session.username,
        role: session.role,
    }))
}
