//! Admin views over players and their registrations.

use axum::{
    Json,
    extract::{Extension, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tourney::{Role, Session, User, export};

use super::{
    AppState,
    errors::{ApiError, auth_error, error_response, registry_error},
};

/// List every player account (admin only).
pub async fn list_players(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<User>>, ApiError> {
    session.require_role(Role::Admin).map_err(auth_error)?;

    let players = state.registry.list_players().await.map_err(registry_error)?;
    Ok(Json(players))
}

/// Download all player registrations as CSV (admin only).
///
/// The body starts with the header row `Player,College,Tournament`; admin
/// registrations are never included.
pub async fn export_registrations(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, ApiError> {
    session.require_role(Role::Admin).map_err(auth_error)?;

    let rows = state
        .registry
        .list_player_registrations()
        .await
        .map_err(registry_error)?;

    let body = export::player_registrations_csv(&rows).map_err(|e| {
        tracing::error!("CSV export failed: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;

    let disposition = format!("attachment; filename=\"{}\"", export::FILE_NAME);
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|_| error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
