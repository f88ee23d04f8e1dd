//! Argon2id password hashing with tunable cost.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashingError {
    #[error("invalid hashing cost: {0}")]
    InvalidCost(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// `memory_kib`, `iterations` and `parallelism` are the Argon2 m/t/p costs.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, HashingError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| HashingError::InvalidCost(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Returns the PHC string for `plaintext` under a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashingError::Hash(e.to_string()))
    }

    /// `Ok(false)` on mismatch; errors only when `hash` cannot be parsed.
    ///
    /// The cost parameters embedded in `hash` are used, so hashes created
    /// under an older cost keep verifying after the configuration changes.
    pub fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, HashingError> {
        let parsed = PasswordHash::new(hash).map_err(|e| HashingError::MalformedHash(e.to_string()))?;
        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashingError::Hash(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::new(8, 1, 1).unwrap()
    }

    #[test]
    fn hash_then_verify() {
        let hasher = cheap();
        let hash = hasher.hash("secret1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(&hash, "secret1").unwrap());
        assert!(!hasher.verify(&hash, "secret2").unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = cheap();
        assert_ne!(hasher.hash("pw").unwrap(), hasher.hash("pw").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            cheap().verify("plainly-not-a-hash", "pw"),
            Err(HashingError::MalformedHash(_))
        ));
    }

    #[test]
    fn zero_iterations_rejected() {
        assert!(matches!(PasswordHasher::new(8, 0, 1), Err(HashingError::InvalidCost(_))));
    }
}
