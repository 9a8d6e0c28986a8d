//! Credential checks and password hashing (Argon2id, PHC string format)

use std::sync::OnceLock;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;
use regex::Regex;

use super::errors::{AuthError, AuthResult};

/// Salt size in bytes
const SALT_SIZE: usize = 16;

/// Minimum password length
const MIN_PASSWORD_LEN: usize = 8;

/// Stored for accounts restored from a backup; never verifies
pub const LOCKED_PASSWORD_HASH: &str = "!locked";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
    })
}

/// Lower-case and trim an email before it is stored or looked up
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> AuthResult<()> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail)
    }
}

/// Require 8+ characters with upper case, lower case and a digit
pub fn check_password_strength(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(
            "Password must be at least 8 characters long.",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one uppercase letter.",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one lowercase letter.",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one number.",
        ));
    }
    Ok(())
}

fn generate_salt() -> AuthResult<SaltString> {
    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    Ok(SaltString::encode_b64(&salt)?)
}

/// Hash a password into a self-describing PHC string
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = generate_salt()?;
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
