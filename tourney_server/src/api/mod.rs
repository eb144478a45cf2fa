//! HTTP API for the tournament registry.
//!
//! # Modules
//!
//! - [`auth`]: User authentication (register, login, logout, token refresh)
//! - [`tournaments`]: Tournament listing, creation, editing and registration
//! - [`players`]: Admin views over players and the CSV export
//! - [`middleware`]: Bearer-token authentication and request logging
//! - [`errors`]: Store/auth error to HTTP status conversion
//!
//! # Security
//!
//! - Access tokens are short-lived JWTs; refresh tokens rotate on every use
//! - Role checks happen in the handlers against the decoded [`tourney::Session`]
//! - Passwords are hashed with Argon2id before storage
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod auth;
pub mod errors;
pub mod middleware;
pub mod players;
pub mod tournaments;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use serde_json::json;
use sqlx::SqlitePool;
use tourney::{AuthManager, RegistryStore};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub registry: Arc<dyn RegistryStore>,
    pub pool: SqlitePool,
}

/// Create the complete API router with all endpoints and middleware.
///
/// ```text
/// GET  /health                              - Health check (public)
/// POST /api/v1/auth/register                - Register user (public)
/// POST /api/v1/auth/login                   - Login (public)
/// POST /api/v1/auth/refresh                 - Refresh token (public)
/// POST /api/v1/auth/logout                  - Logout (auth required)
/// GET  /api/v1/tournaments                  - List tournaments (public)
/// POST /api/v1/tournaments                  - Create tournament (admin)
/// PUT  /api/v1/tournaments/{id}             - Edit tournament (admin)
/// POST /api/v1/tournaments/{id}/register    - Register for tournament (player)
/// GET  /api/v1/me/tournaments               - Own registrations (auth required)
/// GET  /api/v1/players                      - List players (admin)
/// GET  /api/v1/registrations/export         - CSV export (admin)
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(
                    middleware::request_logging_middleware,
                )),
        )
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    let require_auth =
        axum::middleware::from_fn_with_state(state.clone(), middleware::auth_middleware);

    // Public routes (no authentication middleware)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        // Listing is public, creation shares the path but needs a session
        .route(
            "/tournaments",
            get(tournaments::list_tournaments)
                .merge(post(tournaments::create_tournament).layer(require_auth.clone())),
        );

    // Protected routes (require authentication middleware)
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/tournaments/{id}", put(tournaments::update_tournament))
        .route(
            "/tournaments/{id}/register",
            post(tournaments::register_for_tournament),
        )
        .route("/me/tournaments", get(tournaments::my_tournaments))
        .route("/players", get(players::list_players))
        .route(
            "/registrations/export",
            get(players::export_registrations),
        )
        .layer(require_auth);

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the database answers, `503 Service Unavailable` otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
