//! Security Utilities
//!
//! Password hashing, random token generation, and expiry helpers.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};

/// Default bcrypt cost for password hashing
pub const DEFAULT_BCRYPT_COST: u32 = DEFAULT_COST;

/// Length of generated password reset tokens
pub const RESET_TOKEN_LENGTH: usize = 50;

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash_password_with_cost(password, DEFAULT_BCRYPT_COST)
}

/// Hash a password with custom bcrypt cost
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

/// Generate a cryptographically secure random alphanumeric string
pub fn generate_secure_token(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generate an opaque password reset token
pub fn generate_reset_token() -> String {
    generate_secure_token(RESET_TOKEN_LENGTH)
}

/// Create an expiration timestamp relative to now
pub fn create_expiration(duration_minutes: i64) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::minutes(duration_minutes)
}

/// Check if a timestamp has expired
pub fn is_expired(expiry: DateTime<Utc>) -> bool {
    Utc::now() > expiry
}
