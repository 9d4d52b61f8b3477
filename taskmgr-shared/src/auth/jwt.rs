//! Bearer tokens
//!
//! Login issues an HS256-signed JWT whose subject is the user ID. Logging out
//! is the client discarding the token.
//!
//! # Example
//!
//! ```
//! use taskmgr_shared::auth::jwt::{create_token, validate_token, Claims};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let user_id = Uuid::new_v4();
//! let token = create_token(&Claims::new(user_id), "secret")?;
//! assert_eq!(validate_token(&token, "secret")?.sub, user_id);
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim written into and required from every token
pub const ISSUER: &str = "taskmgr";

/// Default token lifetime
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Encoding failed
    #[error("Failed to create token: {0}")]
    Create(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature, issuer or format is wrong
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer - always [`ISSUER`]
    pub iss: String,

    /// Issued at (unix seconds)
    pub iat: i64,

    /// Expires at (unix seconds)
    pub exp: i64,

    /// Not valid before (unix seconds)
    pub nbf: i64,
}

impl Claims {
    /// Claims for `user_id` valid for [`DEFAULT_TTL_HOURS`]
    pub fn new(user_id: Uuid) -> Self {
        Self::with_expiration(user_id, Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// Claims for `user_id` valid for `expires_in`
    pub fn with_expiration(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
        }
    }
}

/// Signs claims with HS256
///
/// # Errors
///
/// Returns `JwtError::Create` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::Create(e.to_string()))
}

/// Verifies signature, issuer, expiry and not-before, then returns the claims
///
/// # Errors
///
/// `JwtError::Expired` for an expired token, `JwtError::Invalid` otherwise
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_nbf = true;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_round_trip_keeps_subject() {
        let user_id = Uuid::new_v4();
        let token = create_token(&Claims::new(user_id), SECRET).unwrap();

        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(&Claims::new(Uuid::new_v4()), SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, "another-secret"),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway
        let claims = Claims::with_expiration(Uuid::new_v4(), Duration::seconds(-120));
        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let mut claims = Claims::new(Uuid::new_v4());
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(validate_token("not.a.token", SECRET).is_err());
    }
}
