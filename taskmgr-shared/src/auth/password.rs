//! Password hashing with Argon2id
//!
//! Hashes are stored in PHC string format, so the parameters and salt travel
//! with the hash and verification needs nothing else.
//!
//! # Example
//!
//! ```
//! use taskmgr_shared::auth::password::{hash_password, verify_password};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("correct horse")?;
//! assert!(verify_password("correct horse", &hash)?);
//! assert!(!verify_password("wrong", &hash)?);
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Hashing failed
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// Stored hash could not be parsed
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),

    /// Verification failed for a reason other than a wrong password
    #[error("Failed to verify password: {0}")]
    Verify(String),
}

/// Hashes a password with Argon2id (19 MiB, 2 passes, 1 lane)
///
/// # Errors
///
/// Returns `PasswordError::Hash` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(19 * 1024)
        .t_cost(2)
        .p_cost(1)
        .build()
        .map_err(|e| PasswordError::Hash(format!("invalid parameters: {e}")))?;

    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Checks a plaintext password against a stored hash
///
/// Returns `Ok(false)` for a wrong password.
///
/// # Errors
///
/// Returns an error if the stored hash is malformed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2id_phc_string() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$"));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_password("correct horse").unwrap();
        let b = hash_password("correct horse").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("correct horse", &a).unwrap());
        assert!(verify_password("correct horse", &b).unwrap());
    }

    #[test]
    fn test_wrong_password_is_not_an_error() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        let result = verify_password("anything", "not-a-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHash(_))));
    }
}
