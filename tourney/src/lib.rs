//! # Tourney
//!
//! Storage and authentication for a small tournament-registration service.
//!
//! Users register as players or admins, admins create and edit tournaments,
//! and players register for them. All persisted state lives in one SQLite
//! database with three tables (users, tournaments, registrations) plus the
//! refresh sessions used by authentication.
//!
//! ## Core Modules
//!
//! - [`db`]: Connection pool, schema bootstrap and query timeouts
//! - [`registry`]: The tournament registry store (users, tournaments, registrations)
//! - [`auth`]: Credential hashing, login and session management
//! - [`export`]: CSV export of player registrations
//!
//! ## Example
//!
//! ```no_run
//! use tourney::{CredentialHasher, Database, NewTournament, RegistryStore, SqliteRegistry};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::in_memory().await?;
//! let registry = SqliteRegistry::new(db.pool().clone(), CredentialHasher::new("pepper"));
//! registry.create_tournament(&NewTournament::new("Cup", "d1")).await?;
//! assert_eq!(registry.list_tournaments().await?.len(), 1);
//! # Ok(())
//! # }
//! ```

/// Authentication and sessions.
pub mod auth;
/// Database pool, schema and timeouts.
pub mod db;
/// CSV export.
pub mod export;
/// The tournament registry store.
pub mod registry;

pub use auth::{AuthError, AuthManager, CredentialHasher, Session};
pub use db::{Database, DatabaseConfig};
pub use registry::{
    NewTournament, PlayerRegistration, RegisteredTournament, RegistryError, RegistryStore, Role,
    SqliteRegistry, Tournament, User,
};
