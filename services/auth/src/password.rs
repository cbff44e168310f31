//! Password hashing with a tunable Argon2id cost

use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use tracing::warn;

/// Smallest accepted cost
pub const MIN_COST: u32 = Params::MIN_T_COST;

/// Largest accepted cost
pub const MAX_COST: u32 = 32;

/// Password hashing service
///
/// The cost is the Argon2 iteration count; each step adds a full pass over
/// the memory block, so latency grows linearly with it.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    /// Create a hashing service with the given cost
    pub fn new(cost: u32) -> Result<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            anyhow::bail!("hash cost {} outside {}..={}", cost, MIN_COST, MAX_COST);
        }

        let params = Params::new(Params::DEFAULT_M_COST, cost, Params::DEFAULT_P_COST, None)
            .map_err(|e| anyhow::anyhow!("Invalid argon2 parameters: {}", e))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt, returning a PHC string
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(hash)
    }

    /// Check a password against a stored hash
    ///
    /// A hash that cannot be parsed never verifies.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                warn!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = PasswordService::new(1).unwrap();
        let hash = service.hash("secret1").unwrap();

        assert!(service.verify("secret1", &hash));
        assert!(!service.verify("secret2", &hash));
        assert!(!service.verify("", &hash));
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let service = PasswordService::new(1).unwrap();
        let hash = service.hash("plaintext-password").unwrap();

        assert!(!hash.contains("plaintext-password"));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let service = PasswordService::new(1).unwrap();
        let first = service.hash("secret1").unwrap();
        let second = service.hash("secret1").unwrap();

        assert_ne!(first, second);
        assert!(service.verify("secret1", &first));
        assert!(service.verify("secret1", &second));
    }

    #[test]
    fn test_cost_is_encoded_in_hash() {
        let hash = PasswordService::new(3).unwrap().hash("secret1").unwrap();
        assert!(hash.contains("t=3"));

        // Verification reads the cost from the hash, not from the service.
        assert!(PasswordService::new(1).unwrap().verify("secret1", &hash));
    }

    #[test]
    fn test_cost_bounds() {
        assert!(PasswordService::new(0).is_err());
        assert!(PasswordService::new(MAX_COST + 1).is_err());
        assert!(PasswordService::new(MIN_COST).is_ok());
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        let service = PasswordService::new(1).unwrap();
        assert!(!service.verify("secret1", "not-a-valid-hash"));
    }
}
