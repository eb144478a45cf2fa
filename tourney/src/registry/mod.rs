//! Tournament registry store.
//!
//! Owns the three persisted entities (users, tournaments and registrations)
//! and exposes create/read/update operations over them through the
//! [`RegistryStore`] trait. Nothing is ever deleted.
//!
//! ## Example
//!
//! ```no_run
//! use tourney::auth::CredentialHasher;
//! use tourney::db::Database;
//! use tourney::registry::{NewTournament, RegistryStore, Role, SqliteRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let registry = SqliteRegistry::new(
//!         db.pool().clone(),
//!         CredentialHasher::new("secret_pepper"),
//!     );
//!
//!     let player = registry
//!         .register_user("alice", "correct horse", Role::Player, Some("MIT"))
//!         .await?;
//!     let cup = registry
//!         .create_tournament(&NewTournament::new("Spring Cup", "Round robin"))
//!         .await?;
//!     registry.register_for_tournament(player, cup).await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod models;
pub mod store;

pub use errors::{RegistryError, RegistryResult};
pub use models::{
    NewTournament, ParseRoleError, PlayerRegistration, RegisteredTournament, RegistrationId,
    Role, Tournament, TournamentId, User, UserId,
};
pub use store::{RegistryStore, SqliteRegistry};
