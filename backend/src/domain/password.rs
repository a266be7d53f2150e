//! Password hashing.
//!
//! Every stored credential is an argon2 PHC string with a random salt. Two
//! legacy forms can still appear after an import: the reversible
//! `base64(password + "salt_ppd+")` obfuscation, which is decoded and rehashed
//! during import, and bcrypt hashes, which are kept but can no longer be
//! verified.

use anyhow::{anyhow, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;

const LEGACY_OBFUSCATION_SUFFIX: &str = "salt_ppd+";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Valid,
    Invalid,
    /// The stored value is not an argon2 hash (e.g. legacy bcrypt)
    UnsupportedScheme,
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, stored_hash: &str) -> PasswordCheck {
    if is_legacy_bcrypt(stored_hash) {
        return PasswordCheck::UnsupportedScheme;
    }
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(_) => return PasswordCheck::UnsupportedScheme,
    };
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => PasswordCheck::Valid,
        Err(_) => PasswordCheck::Invalid,
    }
}

pub fn is_legacy_bcrypt(stored_hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| stored_hash.starts_with(prefix))
}

/// Recovers the plaintext from a legacy obfuscated password, if it is one.
pub fn deobfuscate_legacy(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    decoded
        .strip_suffix(LEGACY_OBFUSCATION_SUFFIX)
        .map(|plain| plain.to_string())
}
