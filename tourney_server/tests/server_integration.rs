//! Integration tests for the HTTP API.
//!
//! Each test builds the full router over its own in-memory database and
//! drives it with `oneshot` requests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tourney::{AuthManager, CredentialHasher, Database, RegistryStore, SqliteRegistry};
use tourney_server::api::{AppState, create_router};
use tower::ServiceExt; // For `oneshot` method

const JWT_SECRET: &str = "test_secret_key_for_testing_only_32+";

/// Helper to create a test server over a fresh database
async fn create_test_server() -> (Database, axum::Router) {
    create_test_server_with(chrono::Duration::minutes(15)).await
}

async fn create_test_server_with(access_token: chrono::Duration) -> (Database, axum::Router) {
    let db = Database::in_memory()
        .await
        .expect("Failed to create test database");

    let hasher = CredentialHasher::with_params("test_pepper_for_testing_only", 8, 1, 1).unwrap();
    let registry: Arc<dyn RegistryStore> =
        Arc::new(SqliteRegistry::new(db.pool().clone(), hasher));
    let auth_manager = Arc::new(
        AuthManager::new(registry.clone(), db.pool().clone(), JWT_SECRET.to_string())
            .with_token_durations(access_token, chrono::Duration::days(7)),
    );

    let state = AppState {
        auth_manager,
        registry,
        pool: db.pool().clone(),
    };

    (db, create_router(state))
}

/// Send a request and return status plus raw body
async fn send_raw(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, bytes.to_vec())
}

/// Send a request and parse the body as JSON (`Null` when empty)
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(app, method, uri, token, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Register an account and return its auth response
async fn register(app: &axum::Router, username: &str, role: &str, college: Option<&str>) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({
            "username": username,
            "password": "Passw0rd!",
            "role": role,
            "college": college,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register {username}: {body}");
    body
}

fn access_token(auth: &Value) -> String {
    auth["access_token"].as_str().unwrap().to_string()
}

async fn create_tournament(app: &axum::Router, admin: &str, name: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/tournaments",
        Some(admin),
        Some(json!({ "name": name, "details": format!("{name} details") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let (_db, app) = create_test_server().await;

    let (status, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
}

// ============================================================================
// Authentication Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_register_returns_tokens() {
    let (_db, app) = create_test_server().await;

    let auth = register(&app, "alice", "player", Some("MIT")).await;

    assert_eq!(auth["username"], "alice");
    assert_eq!(auth["role"], "player");
    assert!(auth["user_id"].as_i64().unwrap() > 0);
    assert!(!access_token(&auth).is_empty());
    assert!(auth["refresh_token"].as_str().is_some());
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let (_db, app) = create_test_server().await;
    register(&app, "bob", "player", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({ "username": "bob", "password": "other", "role": "admin" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("bob"));
}

#[tokio::test]
async fn test_register_admin_with_college_rejected() {
    let (_db, app) = create_test_server().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({ "username": "dean", "password": "x", "role": "admin", "college": "MIT" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login() {
    let (_db, app) = create_test_server().await;
    register(&app, "carol", "admin", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "carol", "password": "Passw0rd!", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "carol", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "carol", "password": "Passw0rd!", "role": "player" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_and_logout() {
    let (_db, app) = create_test_server().await;
    let auth = register(&app, "dana", "player", None).await;
    let refresh = auth["refresh_token"].clone();

    let (status, rotated) = send(&app, "POST", "/api/v1/auth/refresh", None, Some(refresh.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rotated["username"], "dana");
    assert_ne!(rotated["refresh_token"], refresh);

    // Old token was consumed by the rotation
    let (status, _) = send(&app, "POST", "/api/v1/auth/refresh", None, Some(refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Logout requires a session
    let new_refresh = rotated["refresh_token"].clone();
    let (status, _) = send(&app, "POST", "/api/v1/auth/logout", None, Some(new_refresh.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = access_token(&rotated);
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/auth/logout",
        Some(&token),
        Some(new_refresh.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "POST", "/api/v1/auth/refresh", None, Some(new_refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_cannot_revoke_another_users_token() {
    let (_db, app) = create_test_server().await;
    let victim = register(&app, "vera", "player", None).await;
    let other = register(&app, "otto", "player", None).await;
    let victim_refresh = victim["refresh_token"].clone();

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/auth/logout",
        Some(&access_token(&other)),
        Some(victim_refresh.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, rotated) = send(&app, "POST", "/api/v1/auth/refresh", None, Some(victim_refresh)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rotated["username"], "vera");
}

#[tokio::test]
async fn test_expired_access_token_rejected() {
    let (_db, app) = create_test_server_with(chrono::Duration::minutes(-5)).await;
    let auth = register(&app, "erin", "player", None).await;

    let (status, _) = send(
        &app,
        "GET",
        "/api/v1/me/tournaments",
        Some(&access_token(&auth)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_bearer_rejected() {
    let (_db, app) = create_test_server().await;

    let (status, _) = send(&app, "GET", "/api/v1/me/tournaments", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/v1/me/tournaments", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Tournament Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_tournament_listing_is_public() {
    let (_db, app) = create_test_server().await;

    let (status, body) = send(&app, "GET", "/api/v1/tournaments", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let admin = access_token(&register(&app, "root", "admin", None).await);
    let id = create_tournament(&app, &admin, "Cup").await;

    let (status, body) = send(&app, "GET", "/api/v1/tournaments", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["name"], "Cup");
    assert_eq!(list[0]["details"], "Cup details");
}

#[tokio::test]
async fn test_create_tournament_requires_admin() {
    let (_db, app) = create_test_server().await;
    let player = access_token(&register(&app, "finn", "player", None).await);
    let payload = json!({ "name": "Open" });

    let (status, _) = send(&app, "POST", "/api/v1/tournaments", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "POST", "/api/v1/tournaments", Some(&player), Some(payload)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("admin"));

    let (_, list) = send(&app, "GET", "/api/v1/tournaments", None, None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_create_scheduled_tournament() {
    let (_db, app) = create_test_server().await;
    let admin = access_token(&register(&app, "root", "admin", None).await);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/tournaments",
        Some(&admin),
        Some(json!({ "name": "Spring Open", "date": "2025-04-12", "location": "Main Hall", "fee": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = send(&app, "GET", "/api/v1/tournaments", None, None).await;
    assert_eq!(list[0]["location"], "Main Hall");
    assert_eq!(list[0]["fee"], 10.0);
    assert_eq!(list[0]["details"], "");

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/tournaments",
        Some(&admin),
        Some(json!({ "name": "", "details": "nameless" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_tournament() {
    let (_db, app) = create_test_server().await;
    let admin = access_token(&register(&app, "root", "admin", None).await);
    let player = access_token(&register(&app, "gus", "player", None).await);
    let first = create_tournament(&app, &admin, "First").await;
    let second = create_tournament(&app, &admin, "Second").await;

    let update = json!({ "name": "NewName", "details": "NewDetails" });
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/tournaments/{second}"),
        Some(&admin),
        Some(update.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = send(&app, "GET", "/api/v1/tournaments", None, None).await;
    let by_id = |id: i64| {
        list.as_array()
            .unwrap()
            .iter()
            .find(|t| t["id"] == id)
            .cloned()
            .unwrap()
    };
    assert_eq!(by_id(first)["name"], "First");
    assert_eq!(by_id(second)["name"], "NewName");
    assert_eq!(by_id(second)["details"], "NewDetails");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/tournaments/999",
        Some(&admin),
        Some(update.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/tournaments/{first}"),
        Some(&player),
        Some(update),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_player_registration_flow() {
    let (_db, app) = create_test_server().await;
    let admin = access_token(&register(&app, "root", "admin", None).await);
    let player = access_token(&register(&app, "hana", "player", Some("ETH")).await);
    let cup = create_tournament(&app, &admin, "Cup").await;

    let uri = format!("/api/v1/tournaments/{cup}/register");
    let (status, first) = send(&app, "POST", &uri, Some(&player), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["tournament_id"], cup);

    // Registering again creates a second row
    let (status, second) = send(&app, "POST", &uri, Some(&player), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(first["registration_id"], second["registration_id"]);

    let (status, mine) = send(&app, "GET", "/api/v1/me/tournaments", Some(&player), None).await;
    assert_eq!(status, StatusCode::OK);
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|r| r["name"] == "Cup"));

    // Admins cannot register through the API
    let (status, _) = send(&app, "POST", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unknown tournament is rejected by the foreign key
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{}/register", cup + 100),
        Some(&player),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// ============================================================================
// Admin Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_list_players_admin_only() {
    let (_db, app) = create_test_server().await;
    let admin = access_token(&register(&app, "root", "admin", None).await);
    let player = access_token(&register(&app, "ivy", "player", Some("MIT")).await);
    register(&app, "jo", "player", None).await;

    let (status, players) = send(&app, "GET", "/api/v1/players", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = players
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["ivy", "jo"]);
    assert!(players[0].get("password_hash").is_none());

    let (status, _) = send(&app, "GET", "/api/v1/players", Some(&player), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_csv_export() {
    let (_db, app) = create_test_server().await;
    let admin_auth = register(&app, "root", "admin", None).await;
    let admin = access_token(&admin_auth);
    let player = access_token(&register(&app, "kim", "player", Some("Univ. of X, Y")).await);
    let loner = access_token(&register(&app, "lee", "player", None).await);
    let cup = create_tournament(&app, &admin, "Cup").await;

    send(&app, "POST", &format!("/api/v1/tournaments/{cup}/register"), Some(&player), None).await;
    send(&app, "POST", &format!("/api/v1/tournaments/{cup}/register"), Some(&loner), None).await;

    let (status, headers, body) =
        send_raw(&app, "GET", "/api/v1/registrations/export", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    assert!(
        headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("player_registrations.csv")
    );

    let csv = String::from_utf8(body).unwrap();
    assert_eq!(
        csv,
        "Player,College,Tournament\nkim,\"Univ. of X, Y\",Cup\nlee,,Cup\n"
    );

    let (status, _, _) =
        send_raw(&app, "GET", "/api/v1/registrations/export", Some(&player), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
