//! Authentication module providing credential hashing, login and session management.
//!
//! This module implements:
//! - Argon2id password hashing with server-side pepper
//! - JWT access tokens (15-minute expiry) decoded into an explicit [`Session`]
//! - Rotating refresh tokens (7-day expiry)
//!
//! ## Example
//!
//! ```no_run
//! use tourney::auth::{AuthManager, CredentialHasher, LoginRequest};
//! use tourney::db::Database;
//! use tourney::registry::SqliteRegistry;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let registry = SqliteRegistry::new(db.pool().clone(), CredentialHasher::new("pepper"));
//!     let auth = AuthManager::new(
//!         Arc::new(registry),
//!         db.pool().clone(),
//!         "jwt_secret".to_string(),
//!     );
//!
//!     let request = LoginRequest {
//!         username: "alice".to_string(),
//!         password: "correct horse".to_string(),
//!         role: None,
//!     };
//!
//!     let (user, tokens) = auth.login(request).await?;
//!     let session = auth.verify_access_token(&tokens.access_token)?;
//!     assert_eq!(session.user_id, user.id);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod password;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{AccessTokenClaims, LoginRequest, RegisterRequest, Session, SessionTokens};
pub use password::CredentialHasher;
