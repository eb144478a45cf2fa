//! Registry data models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::errors::{RegistryError, RegistryResult};

/// User ID type
pub type UserId = i64;

/// Tournament ID type
pub type TournamentId = i64;

/// Registration ID type
pub type RegistrationId = i64;

/// Account category deciding which operations a user may invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Admin,
}

impl Role {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(Role::Player),
            "admin" => Ok(Role::Admin),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// User model. The credential hash never leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    /// Affiliation label, players only
    pub college: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Stored tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub details: String,
    pub date: Option<String>,
    pub location: Option<String>,
    pub fee: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Tournament creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    #[serde(default)]
    pub details: String,
    pub date: Option<String>,
    pub location: Option<String>,
    pub fee: Option<f64>,
}

impl NewTournament {
    /// Tournament described by a single free-text blob
    pub fn new(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: details.into(),
            date: None,
            location: None,
            fee: None,
        }
    }

    /// Tournament with structured date, location and entry fee
    pub fn scheduled(
        name: impl Into<String>,
        date: impl Into<String>,
        location: impl Into<String>,
        fee: f64,
    ) -> Self {
        Self {
            name: name.into(),
            details: String::new(),
            date: Some(date.into()),
            location: Some(location.into()),
            fee: Some(fee),
        }
    }

    /// Attach free-text details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub(crate) fn validate(&self) -> RegistryResult<()> {
        validate_tournament_name(&self.name)?;
        if self.fee.is_some_and(|fee| !fee.is_finite() || fee < 0.0) {
            return Err(RegistryError::Validation(
                "fee must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_tournament_name(name: &str) -> RegistryResult<()> {
    if name.trim().is_empty() {
        return Err(RegistryError::Validation(
            "tournament name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// A tournament the user holds a registration for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredTournament {
    pub registration_id: RegistrationId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub details: String,
}

/// Row of the administrative player/registration listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRegistration {
    pub username: String,
    pub college: Option<String>,
    pub tournament: String,
}
