//! Credential hashing.
//!
//! Passwords are stored as Argon2id PHC strings with a random per-hash salt and
//! a server-side pepper appended before hashing. Verification reads the cost
//! parameters back from the stored hash, so tuning the cost only affects new
//! hashes.

use std::fmt;
use std::sync::{Arc, OnceLock};

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::registry::{RegistryError, RegistryResult};

/// Argon2id hasher carrying the server pepper
#[derive(Clone)]
pub struct CredentialHasher {
    pepper: String,
    params: Params,
    decoy: Arc<OnceLock<String>>,
}

impl CredentialHasher {
    /// Hasher with the Argon2 default cost (19 MiB, 2 passes, 1 lane)
    pub fn new(pepper: impl Into<String>) -> Self {
        Self {
            pepper: pepper.into(),
            params: Params::default(),
            decoy: Arc::default(),
        }
    }

    /// Hasher with explicit cost parameters
    ///
    /// # Errors
    ///
    /// * `RegistryError::Validation` - Parameters outside Argon2's accepted ranges
    pub fn with_params(
        pepper: impl Into<String>,
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> RegistryResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| RegistryError::Validation(format!("invalid Argon2 parameters: {e}")))?;
        Ok(Self {
            pepper: pepper.into(),
            params,
            decoy: Arc::default(),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash password with Argon2id + pepper
    pub fn hash(&self, password: &str) -> RegistryResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2()
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| RegistryError::HashingFailed)?
            .to_string())
    }

    /// Verify password against a stored hash. Malformed hashes never verify.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let peppered = format!("{}{}", password, self.pepper);
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl CredentialHasher {
    /// Run a full verification against a throwaway hash and discard the result.
    ///
    /// Called when the account does not exist, so unknown usernames cost the
    /// same as wrong passwords.
    pub fn verify_decoy(&self, password: &str) {
        let decoy = match self.decoy.get() {
            Some(decoy) => decoy,
            None => match self.hash("decoy credential") {
                Ok(hash) => self.decoy.get_or_init(|| hash),
                Err(_) => return,
            },
        };
        let _ = self.verify(password, decoy);
    }
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("pepper", &"<redacted>")
            .field("params", &self.params)
            .finish()
    }
}
