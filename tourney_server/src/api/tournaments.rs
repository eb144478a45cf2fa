//! Tournament API handlers.
//!
//! Listing is public. Creating and editing require an admin session;
//! registering requires a player session.
//!
//! # Examples
//!
//! Create a tournament:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tournaments \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Spring Open", "date": "2025-04-12", "location": "Main Hall", "fee": 10.0}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tourney::{
    NewTournament, RegisteredTournament, Role, Session, Tournament,
    registry::{RegistrationId, TournamentId},
};

use super::{
    AppState,
    errors::{ApiError, auth_error, error_response, registry_error},
};

#[derive(Debug, Deserialize)]
pub struct UpdateTournamentRequest {
    pub name: String,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedTournament {
    pub id: TournamentId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedRegistration {
    pub registration_id: RegistrationId,
    pub tournament_id: TournamentId,
}

/// List every tournament in creation order.
///
/// # Errors
///
/// - `500 Internal Server Error`: Database or server error
pub async fn list_tournaments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Tournament>>, ApiError> {
    let tournaments = state
        .registry
        .list_tournaments()
        .await
        .map_err(registry_error)?;
    Ok(Json(tournaments))
}

/// Create a tournament (admin only).
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Spring Open",
///   "details": "Swiss, 5 rounds",  // Optional
///   "date": "2025-04-12",          // Optional
///   "location": "Main Hall",       // Optional
///   "fee": 10.0                    // Optional, non-negative
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Empty name or negative fee
/// - `403 Forbidden`: Caller is not an admin
pub async fn create_tournament(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(request): Json<NewTournament>,
) -> Result<(StatusCode, Json<CreatedTournament>), ApiError> {
    session.require_role(Role::Admin).map_err(auth_error)?;

    let id = state
        .registry
        .create_tournament(&request)
        .await
        .map_err(registry_error)?;

    tracing::info!(
        admin = %session.username,
        tournament_id = id,
        "Tournament created"
    );
    Ok((StatusCode::CREATED, Json(CreatedTournament { id })))
}

/// Overwrite a tournament's name and details (admin only).
///
/// # Errors
///
/// - `400 Bad Request`: Empty name
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: No tournament with that ID
pub async fn update_tournament(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<UpdateTournamentRequest>,
) -> Result<StatusCode, ApiError> {
    session.require_role(Role::Admin).map_err(auth_error)?;

    let updated = state
        .registry
        .update_tournament(tournament_id, &request.name, &request.details)
        .await
        .map_err(registry_error)?;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Tournament {tournament_id} not found"),
        ))
    }
}

/// Register the calling player for a tournament.
///
/// Registering twice creates a second registration.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a player
/// - `409 Conflict`: No tournament with that ID
pub async fn register_for_tournament(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<(StatusCode, Json<CreatedRegistration>), ApiError> {
    session.require_role(Role::Player).map_err(auth_error)?;

    let registration_id = state
        .registry
        .register_for_tournament(session.user_id, tournament_id)
        .await
        .map_err(registry_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedRegistration {
            registration_id,
            tournament_id,
        }),
    ))
}

/// Tournaments the caller has registered for, in registration order.
pub async fn my_tournaments(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<RegisteredTournament>>, ApiError> {
    let registered = state
        .registry
        .list_registered_tournaments(session.user_id)
        .await
        .map_err(registry_error)?;
    Ok(Json(registered))
}
