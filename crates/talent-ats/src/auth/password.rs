//! Admin password hashes in PHC string format (`$argon2id$v=19$...`).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(#[from] password_hash::Error);

/// Hashes with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    encode(password, &salt)
}

/// Hashes with a caller-chosen salt of at least eight bytes.
pub fn hash_password_with_salt(password: &str, salt: &str) -> Result<String, PasswordError> {
    let salt = SaltString::encode_b64(salt.as_bytes())?;
    encode(password, &salt)
}

/// Checks a password against a PHC hash. Malformed hashes never verify.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    match PasswordHash::new(encoded.trim()) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// True when `encoded` parses as a PHC string.
pub fn is_password_hash(encoded: &str) -> bool {
    PasswordHash::new(encoded.trim()).is_ok()
}

fn encode(password: &str, salt: &SaltString) -> Result<String, PasswordError> {
    let hash = Argon2::default().hash_password(password.as_bytes(), salt)?;
    Ok(hash.to_string())
}
