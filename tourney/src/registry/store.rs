//! The tournament registry store contract and its SQLite implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use super::{
    errors::{RegistryError, RegistryResult},
    models::{
        NewTournament, PlayerRegistration, RegisteredTournament, RegistrationId, Role, Tournament,
        TournamentId, User, UserId, validate_tournament_name,
    },
};
use crate::auth::CredentialHasher;
use crate::db::timeouts::with_default_timeout;

/// Every read and write of users, tournaments and registrations goes through
/// this trait. Each operation is a single statement committed on its own.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Create a user account. Surrounding whitespace is stripped from the
    /// username before it is stored.
    ///
    /// # Errors
    ///
    /// * `RegistryError::Validation` - Empty username, or an affiliation on an admin
    /// * `RegistryError::ConstraintViolation` - Username already exists
    async fn register_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        affiliation: Option<&str>,
    ) -> RegistryResult<UserId>;

    /// Look up a user by credentials. The username is trimmed the same way
    /// `register_user` trims it. A miss is `Ok(None)`, never an error.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        role: Option<Role>,
    ) -> RegistryResult<Option<User>>;

    /// Find user by ID
    async fn find_user(&self, user_id: UserId) -> RegistryResult<Option<User>>;

    /// Insert a tournament and return its generated ID
    async fn create_tournament(&self, tournament: &NewTournament) -> RegistryResult<TournamentId>;

    /// Overwrite name and details. Returns `false` when no tournament has that ID.
    async fn update_tournament(
        &self,
        tournament_id: TournamentId,
        name: &str,
        details: &str,
    ) -> RegistryResult<bool>;

    /// All tournaments in insertion order
    async fn list_tournaments(&self) -> RegistryResult<Vec<Tournament>>;

    /// All users with the player role
    async fn list_players(&self) -> RegistryResult<Vec<User>>;

    /// Record a registration. Repeat registrations produce additional rows.
    ///
    /// # Errors
    ///
    /// * `RegistryError::ConstraintViolation` - User or tournament does not exist
    async fn register_for_tournament(
        &self,
        user_id: UserId,
        tournament_id: TournamentId,
    ) -> RegistryResult<RegistrationId>;

    /// Tournaments the user is registered for, in registration order
    async fn list_registered_tournaments(
        &self,
        user_id: UserId,
    ) -> RegistryResult<Vec<RegisteredTournament>>;

    /// Every registration held by a player, in registration order
    async fn list_player_registrations(&self) -> RegistryResult<Vec<PlayerRegistration>>;
}

/// SQLite implementation of `RegistryStore`
#[derive(Clone)]
pub struct SqliteRegistry {
    pool: SqlitePool,
    hasher: CredentialHasher,
}

impl SqliteRegistry {
    pub fn new(pool: SqlitePool, hasher: CredentialHasher) -> Self {
        Self { pool, hasher }
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        role: role.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        college: row.try_get("college")?,
        created_at: row.try_get("created_at")?,
    })
}

fn tournament_from_row(row: &SqliteRow) -> Result<Tournament, sqlx::Error> {
    Ok(Tournament {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        details: row.try_get("details")?,
        date: row.try_get("date")?,
        location: row.try_get("location")?,
        fee: row.try_get("fee")?,
        created_at: row.try_get("created_at")?,
    })
}

fn normalize_affiliation(affiliation: Option<&str>) -> Option<String> {
    affiliation
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl RegistryStore for SqliteRegistry {
    async fn register_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        affiliation: Option<&str>,
    ) -> RegistryResult<UserId> {
        let username = username.trim();
        if username.is_empty() {
            return Err(RegistryError::Validation(
                "username must not be empty".to_string(),
            ));
        }

        let college = normalize_affiliation(affiliation);
        if role == Role::Admin && college.is_some() {
            return Err(RegistryError::Validation(
                "affiliation applies to players only".to_string(),
            ));
        }

        let password_hash = self.hasher.hash(password)?;

        let result = with_default_timeout(
            sqlx::query(
                "INSERT INTO users (username, password_hash, role, college, created_at)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(username)
            .bind(&password_hash)
            .bind(role.as_str())
            .bind(&college)
            .bind(Utc::now())
            .execute(&self.pool),
        )
        .await
        .map_err(|e| match RegistryError::from(e) {
            RegistryError::ConstraintViolation(_) => RegistryError::ConstraintViolation(format!(
                "username '{username}' already exists"
            )),
            other => other,
        })?;

        let user_id = result.last_insert_rowid();
        log::info!("Registered {} {} (id {})", role, username, user_id);
        Ok(user_id)
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        role: Option<Role>,
    ) -> RegistryResult<Option<User>> {
        let username = username.trim();
        let row = with_default_timeout(
            sqlx::query(
                "SELECT id, username, password_hash, role, college, created_at
                 FROM users WHERE username = ?",
            )
            .bind(username)
            .fetch_optional(&self.pool),
        )
        .await?;

        let Some(row) = row else {
            // Same hashing cost as a real account
            self.hasher.verify_decoy(password);
            log::debug!("Authentication miss: unknown user {}", username);
            return Ok(None);
        };

        let password_hash: String = row.try_get("password_hash")?;
        if !self.hasher.verify(password, &password_hash) {
            log::debug!("Authentication miss: bad credentials for {}", username);
            return Ok(None);
        }

        let user = user_from_row(&row)?;
        if role.is_some_and(|r| r != user.role) {
            log::debug!("Authentication miss: {} is not {:?}", username, role);
            return Ok(None);
        }

        Ok(Some(user))
    }

    async fn find_user(&self, user_id: UserId) -> RegistryResult<Option<User>> {
        let row = with_default_timeout(
            sqlx::query("SELECT id, username, role, college, created_at FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn create_tournament(&self, tournament: &NewTournament) -> RegistryResult<TournamentId> {
        tournament.validate()?;

        let result = with_default_timeout(
            sqlx::query(
                "INSERT INTO tournaments (name, details, date, location, fee, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&tournament.name)
            .bind(&tournament.details)
            .bind(&tournament.date)
            .bind(&tournament.location)
            .bind(tournament.fee)
            .bind(Utc::now())
            .execute(&self.pool),
        )
        .await?;

        let tournament_id = result.last_insert_rowid();
        log::info!("Created tournament {} (id {})", tournament.name, tournament_id);
        Ok(tournament_id)
    }

    async fn update_tournament(
        &self,
        tournament_id: TournamentId,
        name: &str,
        details: &str,
    ) -> RegistryResult<bool> {
        validate_tournament_name(name)?;

        let result = with_default_timeout(
            sqlx::query("UPDATE tournaments SET name = ?, details = ? WHERE id = ?")
                .bind(name)
                .bind(details)
                .bind(tournament_id)
                .execute(&self.pool),
        )
        .await?;

        let updated = result.rows_affected() > 0;
        if !updated {
            log::debug!("Update of unknown tournament {} ignored", tournament_id);
        }
        Ok(updated)
    }

    async fn list_tournaments(&self) -> RegistryResult<Vec<Tournament>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT id, name, details, date, location, fee, created_at
                 FROM tournaments ORDER BY id",
            )
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows
            .iter()
            .map(tournament_from_row)
            .collect::<Result<_, _>>()?)
    }

    async fn list_players(&self) -> RegistryResult<Vec<User>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT id, username, role, college, created_at
                 FROM users WHERE role = ? ORDER BY id",
            )
            .bind(Role::Player.as_str())
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.iter().map(user_from_row).collect::<Result<_, _>>()?)
    }

    async fn register_for_tournament(
        &self,
        user_id: UserId,
        tournament_id: TournamentId,
    ) -> RegistryResult<RegistrationId> {
        let result = with_default_timeout(
            sqlx::query(
                "INSERT INTO registrations (user_id, tournament_id, registered_at)
                 VALUES (?, ?, ?)",
            )
            .bind(user_id)
            .bind(tournament_id)
            .bind(Utc::now())
            .execute(&self.pool),
        )
        .await?;

        let registration_id = result.last_insert_rowid();
        log::info!(
            "User {} registered for tournament {} (registration {})",
            user_id,
            tournament_id,
            registration_id
        );
        Ok(registration_id)
    }

    async fn list_registered_tournaments(
        &self,
        user_id: UserId,
    ) -> RegistryResult<Vec<RegisteredTournament>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT r.id AS registration_id, t.id AS tournament_id, t.name, t.details
                 FROM registrations r
                 INNER JOIN tournaments t ON t.id = r.tournament_id
                 WHERE r.user_id = ?
                 ORDER BY r.id",
            )
            .bind(user_id)
            .fetch_all(&self.pool),
        )
        .await?;

        rows.iter()
            .map(|row| -> RegistryResult<RegisteredTournament> {
                Ok(RegisteredTournament {
                    registration_id: row.try_get("registration_id")?,
                    tournament_id: row.try_get("tournament_id")?,
                    name: row.try_get("name")?,
                    details: row.try_get("details")?,
                })
            })
            .collect()
    }

    async fn list_player_registrations(&self) -> RegistryResult<Vec<PlayerRegistration>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT u.username, u.college, t.name AS tournament
                 FROM registrations r
                 INNER JOIN users u ON u.id = r.user_id
                 INNER JOIN tournaments t ON t.id = r.tournament_id
                 WHERE u.role = ?
                 ORDER BY r.id",
            )
            .bind(Role::Player.as_str())
            .fetch_all(&self.pool),
        )
        .await?;

        rows.iter()
            .map(|row| -> RegistryResult<PlayerRegistration> {
                Ok(PlayerRegistration {
                    username: row.try_get("username")?,
                    college: row.try_get("college")?,
                    tournament: row.try_get("tournament")?,
                })
            })
            .collect()
    }
}
