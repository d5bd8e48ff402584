use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use super::errors::AccountError;

// ============================================================================
// Credential Hashing
// ============================================================================

/// One-way, salted password hashing with verify-by-recompute.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, raw_password: &str) -> Result<String, AccountError>;

    /// `false` for a mismatch and for a stored hash that cannot be parsed.
    fn verify(&self, raw_password: &str, stored_hash: &str) -> bool;
}

/// Argon2id with a fresh random salt per hash, stored as a PHC string.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, AccountError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| AccountError::Hashing(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, raw_password: &str) -> Result<String, AccountError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|e| AccountError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, raw_password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            tracing::warn!("Stored credential hash is not a valid PHC string");
            return false;
        };

        // Parameters come from the stored hash, so old hashes keep verifying
        // after the configured cost changes.
        self.argon2()
            .verify_password(raw_password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> Argon2Hasher {
    // Minimum cost keeps the suite fast; production uses the configured cost.
    Argon2Hasher::new(Params::MIN_M_COST.max(8), 1).unwrap()
}
