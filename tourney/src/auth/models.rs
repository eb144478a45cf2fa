//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};
use crate::registry::{Role, UserId};

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub college: Option<String>,
}

/// User login request. When `role` is set the account must hold that role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: Option<Role>,
}

/// Session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT claims for access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: UserId, // User ID
    pub username: String,
    pub role: Role,
    pub exp: i64, // Expiration timestamp
    pub iat: i64, // Issued at timestamp
}

/// Authenticated identity handed to every request handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Fail with `AuthError::Forbidden` unless the session holds `role`
    pub fn require_role(&self, role: Role) -> AuthResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(AuthError::Forbidden { required: role })
        }
    }
}

impl From<AccessTokenClaims> for Session {
    fn from(claims: AccessTokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }
}
