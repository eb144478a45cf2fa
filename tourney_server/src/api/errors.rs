//! Conversion of store and auth errors into HTTP responses.
//!
//! Clients only ever see `client_message()`; storage details are logged here
//! and never returned.

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use tourney::{AuthError, RegistryError};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every handler's `Result`
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn registry_status(err: &RegistryError) -> StatusCode {
    if err.is_persistence() {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    match err {
        RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
        // Only constraint violations remain
        _ => StatusCode::CONFLICT,
    }
}

pub fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Registry(inner) => registry_status(inner),
        AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AuthError::InvalidCredentials
        | AuthError::UserNotFound
        | AuthError::JwtError(_)
        | AuthError::SessionExpired
        | AuthError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
    }
}

pub fn registry_error(err: RegistryError) -> ApiError {
    let status = registry_status(&err);
    if status.is_server_error() {
        tracing::error!("Registry failure: {}", err);
    }
    error_response(status, err.client_message())
}

pub fn auth_error(err: AuthError) -> ApiError {
    let status = auth_status(&err);
    if status.is_server_error() {
        tracing::error!("Auth failure: {}", err);
    }
    error_response(status, err.client_message())
}
