//! Password hashing and verification utilities.
//!
//! Stored passwords are Argon2id PHC strings. Records created at runtime may still
//! carry a plaintext password; those are compared through fixed-length digests.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sha2::{Digest, Sha256};

/// Hash a password using Argon2id.
///
/// Returns the PHC-formatted hash string suitable for storage.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// Returns true if the password matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Whether `stored` is already an Argon2 PHC hash string.
///
/// Other PHC-shaped values (`$hunter2`) are plaintext passwords.
pub fn is_password_hash(stored: &str) -> bool {
    PasswordHash::new(stored)
        .is_ok_and(|parsed| matches!(parsed.algorithm.as_str(), "argon2id" | "argon2i" | "argon2d"))
}

/// Check a presented password against whatever is stored for the user.
pub fn credentials_match(stored: &str, presented: &str) -> bool {
    if is_password_hash(stored) {
        return verify_password(presented, stored);
    }
    let a = Sha256::digest(stored.as_bytes());
    let b = Sha256::digest(presented.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
