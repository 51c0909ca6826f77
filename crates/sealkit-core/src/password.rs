//! Password validation and hashing.
//!
//! Passwords that lock private keys must meet a minimum length. Stored
//! password hashes use Argon2id in PHC string format, so the parameters
//! travel with the hash and can be checked for upgrades later.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params};

use crate::error::{Result, SealError};

/// Minimum password length in characters.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate password meets minimum security requirements.
///
/// # Requirements
///
/// - At least 8 characters long
/// - Not empty or only whitespace
///
/// # Examples
///
/// ```
/// use sealkit_core::password::validate_password;
///
/// assert!(validate_password("my-secure-password-123").is_ok());
/// assert!(validate_password("short").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(SealError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(SealError::InvalidInput(format!(
            "Password must be at least {} characters (got {})",
            MIN_PASSWORD_LENGTH,
            password.chars().count()
        )));
    }

    Ok(())
}

/// Hash a password with Argon2id and a random salt.
///
/// Returns a PHC string (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`).
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SealError::Provider(format!("Password hashing failed: {}", e)))
}

/// Check a password against a PHC hash string.
///
/// # Errors
///
/// Returns `SealError::InvalidInput` if `hash` is not a PHC string. A wrong
/// password is `Ok(false)`, not an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = parse_hash(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(SealError::Provider(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Whether `hash` was produced with anything other than current defaults.
pub fn needs_rehash(hash: &str) -> Result<bool> {
    let parsed = parse_hash(hash)?;
    if parsed.algorithm != Algorithm::Argon2id.ident() {
        return Ok(true);
    }
    let params = Params::try_from(&parsed)
        .map_err(|e| SealError::InvalidInput(format!("Invalid Argon2 parameters: {}", e)))?;
    Ok(params.m_cost() != Params::DEFAULT_M_COST
        || params.t_cost() != Params::DEFAULT_T_COST
        || params.p_cost() != Params::DEFAULT_P_COST)
}

fn parse_hash(hash: &str) -> Result<PasswordHash<'_>> {
    PasswordHash::new(hash)
        .map_err(|e| SealError::InvalidInput(format!("Invalid password hash: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("my-secure-password-123").is_ok());
        assert!(validate_password("exactly12chr").is_ok());
    }

    #[test]
    fn test_password_too_short() {
        let result = validate_password("short");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("at least 8 characters"));
    }

    #[test]
    fn test_password_empty() {
        assert!(validate_password("").is_err());
        assert!(validate_password("   ").is_err());
        assert!(validate_password("\n\t").is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong horse battery", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(SealError::InvalidInput(_))));
    }

    #[test]
    fn test_needs_rehash() {
        let current = hash_password("password-123").unwrap();
        assert!(!needs_rehash(&current).unwrap());

        let weaker = "$argon2id$v=19$m=8,t=1,p=1$c29tZXNhbHQxMjM0$Gfa3C9CIS0c2oAxhkRoFtdMG5Om9FQiAKlBT6dJlduY";
        assert!(needs_rehash(weaker).unwrap());
    }
}
