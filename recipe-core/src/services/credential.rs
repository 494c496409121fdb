//! Credential store - password hashing and verification
//!
//! Passwords are hashed with Argon2id and stored as PHC strings, which carry
//! the algorithm, parameters and salt alongside the hash.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;

use crate::domain::credential::SALT_LEN;
use crate::domain::result::{Error, Result};
use crate::domain::Argon2Params;

/// Hashes and verifies user passwords
#[derive(Debug, Clone)]
pub struct CredentialStore {
    params: Argon2Params,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(Argon2Params::default())
    }
}

impl CredentialStore {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Argon2Params {
        &self.params
    }

    fn hasher(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.params.memory_cost,
            self.params.time_cost,
            self.params.parallelism,
            Some(self.params.hash_len as usize),
        )
        .map_err(|e| Error::Credential(format!("Invalid argon2 params: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt: [u8; SALT_LEN] = rand::thread_rng().gen();
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| Error::Credential(format!("Failed to encode salt: {}", e)))?;

        let hash = self
            .hasher()?
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| Error::Credential(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Check a password against a stored hash.
    ///
    /// The parameters are read from the stored hash. A malformed hash never
    /// verifies.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn fast_params() -> Argon2Params {
    Argon2Params {
        time_cost: 1,
        memory_cost: 1024,
        parallelism: 1,
        hash_len: 32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_not_plaintext_and_verifies() {
        let store = CredentialStore::new(fast_params());
        let hash = store.hash("password1").unwrap();

        assert_ne!(hash, "password1");
        assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(store.verify("password1", &hash));
        assert!(!store.verify("password2", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let store = CredentialStore::new(fast_params());
        let first = store.hash("test123").unwrap();
        let second = store.hash("test123").unwrap();

        assert_ne!(first, second);
        assert!(store.verify("test123", &first));
        assert!(store.verify("test123", &second));
    }

    #[test]
    fn test_verify_uses_params_from_hash() {
        let old = CredentialStore::new(fast_params());
        let hash = old.hash("s3cret").unwrap();

        let mut stronger = fast_params();
        stronger.time_cost = 2;
        let new = CredentialStore::new(stronger);
        assert!(new.verify("s3cret", &hash));
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        let store = CredentialStore::new(fast_params());
        assert!(!store.verify("anything", ""));
        assert!(!store.verify("anything", "anything"));
        assert!(!store.verify("x", "$argon2id$garbage"));
    }

    #[test]
    fn test_invalid_params_fail_hashing() {
        let store = CredentialStore::new(Argon2Params {
            time_cost: 0,
            memory_cost: 1,
            parallelism: 1,
            hash_len: 32,
        });
        assert!(matches!(store.hash("pw"), Err(Error::Credential(_))));
    }
}
