//! Password hashing and generation.
//!
//! Argon2id with per-password random salts; hashes are stored in PHC string
//! format so parameters can evolve without a migration.

use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;

/// Length of server-generated initial passwords.
pub const GENERATED_PASSWORD_LEN: usize = 12;

static ARGON2: LazyLock<Argon2<'static>> = LazyLock::new(Argon2::default);

/// Errors from hashing or verifying passwords.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(argon2::password_hash::Error),
}

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if the hasher fails.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = ARGON2
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
///
/// # Errors
///
/// Returns `PasswordError::MalformedHash` if the stored hash cannot be parsed.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(PasswordError::MalformedHash)?;
    Ok(ARGON2
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}

/// Generate a random alphanumeric password for accounts created without one.
#[must_use]
pub fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_roundtrip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-input").unwrap();
        let b = hash_password("same-input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error_not_a_mismatch() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }

    #[test]
    fn test_generated_password_shape() {
        let password = generate_password();
        assert_eq!(password.len(), GENERATED_PASSWORD_LEN);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_passwords_differ() {
        assert_ne!(generate_password(), generate_password());
    }
}
