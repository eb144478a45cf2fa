//! Schema bootstrap.
//!
//! Tables are created with `IF NOT EXISTS`, so running the bootstrap against an
//! already initialised database is a no-op.

use sqlx::SqlitePool;

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        username      TEXT    NOT NULL UNIQUE,
        password_hash TEXT    NOT NULL,
        role          TEXT    NOT NULL CHECK (role IN ('player', 'admin')),
        college       TEXT,
        created_at    TEXT    NOT NULL
    )
"#;

const CREATE_TOURNAMENTS: &str = r#"
    CREATE TABLE IF NOT EXISTS tournaments (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        name       TEXT    NOT NULL,
        details    TEXT    NOT NULL DEFAULT '',
        date       TEXT,
        location   TEXT,
        fee        REAL,
        created_at TEXT    NOT NULL
    )
"#;

// No UNIQUE(user_id, tournament_id): repeat registrations are kept.
const CREATE_REGISTRATIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS registrations (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id       INTEGER NOT NULL REFERENCES users (id),
        tournament_id INTEGER NOT NULL REFERENCES tournaments (id),
        registered_at TEXT    NOT NULL
    )
"#;

const CREATE_REGISTRATIONS_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_registrations_user ON registrations (user_id)";

const CREATE_SESSIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token      TEXT    PRIMARY KEY NOT NULL,
        user_id    INTEGER NOT NULL REFERENCES users (id),
        created_at TEXT    NOT NULL,
        expires_at TEXT    NOT NULL
    )
"#;

/// Create every table the registry and the session store need.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in [
        CREATE_USERS,
        CREATE_TOURNAMENTS,
        CREATE_REGISTRATIONS,
        CREATE_REGISTRATIONS_USER_INDEX,
        CREATE_SESSIONS,
    ] {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        // Database::new already ran it once.
        ensure_schema(db.pool()).await.expect("second run should succeed");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        assert_eq!(tables, vec!["registrations", "sessions", "tournaments", "users"]);
    }

    #[tokio::test]
    async fn test_role_check_constraint() {
        let db = Database::in_memory().await.unwrap();
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, role, created_at) VALUES ('x', 'h', 'referee', '')",
        )
        .execute(db.pool())
        .await;
        assert!(result.is_err(), "unknown roles must be rejected by the schema");
    }
}
