//! Authentication and request logging middleware.
//!
//! `auth_middleware` turns the `Authorization: Bearer <token>` header into a
//! [`Session`] stored in request extensions. Handlers behind it extract the
//! session and check roles themselves:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use tourney::{Role, Session};
//!
//! async fn admin_only(Extension(session): Extension<Session>) -> String {
//!     match session.require_role(Role::Admin) {
//!         Ok(()) => format!("Hello, {}", session.username),
//!         Err(e) => e.to_string(),
//!     }
//! }
//! # let _ = admin_only;
//! ```

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tourney::Session;

use super::{
    AppState,
    errors::{auth_error, error_response},
};
use crate::logging::log_api_request;

/// Authentication middleware that validates JWT tokens and injects the session.
///
/// - **Success**: Token valid → Injects [`Session`] into request extensions → Calls next handler
/// - **Missing or malformed header**: Returns `401 Unauthorized`
/// - **Invalid/expired token**: Returns `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return error_response(StatusCode::UNAUTHORIZED, "Missing bearer token").into_response();
    };

    match state.auth_manager.verify_access_token(token) {
        Ok(session) => {
            request.extensions_mut().insert::<Session>(session);
            next.run(request).await
        }
        Err(e) => auth_error(e).into_response(),
    }
}

/// Log method, path, status and latency of every request
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    log_api_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        duration_ms,
    );
    response
}
