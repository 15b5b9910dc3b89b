//! Password hashing, verification and strength rules

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "sunshine",
    "football",
    "baseball",
    "cricket1",
    "welcome1",
    "letmein1",
    "admin123",
    "abc12345",
    "trustno1",
    "princess",
    "superman",
];

/// Error types for password operations
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHashFormat(String),

    /// Password fails one or more strength rules
    #[error("{}", .0.join(" "))]
    Weak(Vec<String>),
}

/// Hash a password using Argon2id
///
/// Returns a PHC-formatted string (`$argon2id$v=19$...`) suitable for storage.
///
/// # Example
/// ```
/// use wicket_auth::password::hash_password;
///
/// let hash = hash_password("MySecurePassword123!").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a password against a stored hash
///
/// # Example
/// ```
/// use wicket_auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("MyPassword123!").unwrap();
/// assert!(verify_password("MyPassword123!", &hash).unwrap());
/// assert!(!verify_password("WrongPassword", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHashFormat(e.to_string()))?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
    }
}

/// Check a new password against the registration rules
///
/// All failing rules are reported together.
pub fn validate_password_strength(password: &str, username: &str) -> Result<(), PasswordError> {
    let mut problems = Vec::new();

    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        problems.push("The password is too similar to the username.".to_string());
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("This password is too common.".to_string());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(PasswordError::Weak(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problems(password: &str, username: &str) -> Vec<String> {
        match validate_password_strength(password, username) {
            Ok(()) => Vec::new(),
            Err(PasswordError::Weak(problems)) => problems,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn test_hash_password_produces_valid_hash() {
        let hash = hash_password("TestPassword123!").expect("Failed to hash password");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
    }

    #[test]
    fn test_verify_password_correct_and_incorrect() {
        let hash = hash_password("CorrectPassword123!").expect("Failed to hash password");

        assert!(verify_password("CorrectPassword123!", &hash).unwrap());
        assert!(!verify_password("WrongPassword123!", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("AnyPassword", "invalid_hash_format");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat(_))));
    }

    #[test]
    fn test_hash_password_different_salts() {
        let hash1 = hash_password("SamePassword123!").unwrap();
        let hash2 = hash_password("SamePassword123!").unwrap();

        assert_ne!(hash1, hash2, "Hashes should differ due to random salts");
        assert!(verify_password("SamePassword123!", &hash1).unwrap());
        assert!(verify_password("SamePassword123!", &hash2).unwrap());
    }

    #[test]
    fn test_strong_password_accepted() {
        assert!(validate_password_strength("Cover-Drive#2024", "virat").is_ok());
    }

    #[test]
    fn test_short_password_rejected() {
        let found = problems("Ab1!", "virat");
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("at least 8 characters"));
    }

    #[test]
    fn test_numeric_and_common_password_reports_both() {
        let found = problems("12345678", "virat");
        assert_eq!(
            found,
            vec![
                "This password is too common.".to_string(),
                "This password is entirely numeric.".to_string(),
            ]
        );
    }

    #[test]
    fn test_password_equal_to_username_rejected() {
        let found = problems("SachinTendulkar", "sachintendulkar");
        assert_eq!(found, vec!["The password is too similar to the username.".to_string()]);
    }

    #[test]
    fn test_weak_error_message_joins_problems() {
        let err = validate_password_strength("1234", "u").unwrap_err();
        assert_eq!(
            err.to_string(),
            "This password is too short. It must contain at least 8 characters. This password is entirely numeric."
        );
    }
}
