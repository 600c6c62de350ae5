use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};

use super::errors::IdentityError;

/// Turns a plaintext password into a storable hash
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, IdentityError>;

    fn verify(&self, plain: &str, hash: &str) -> bool;
}

/// Argon2id with a fresh random salt per hash
#[derive(Debug, Default, Clone)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, IdentityError> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| IdentityError::PasswordHash(e.to_string()))
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_original_password() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("password").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("password", &hash));
        assert!(!hasher.verify("wrong", &hash));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let hasher = Argon2Hasher;
        assert_ne!(hasher.hash("password").unwrap(), hasher.hash("password").unwrap());
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        assert!(!Argon2Hasher.verify("password", "not-a-phc-string"));
    }
}
