//! Authentication and authorization
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`jwt`]: Bearer token issuance and validation
//! - [`authorization`]: The acting identity and the ownership predicates
//!   that gate mutations
//!
//! # Example
//!
//! ```
//! use taskmgr_shared::auth::authorization::{require_authenticated, Actor};
//! use taskmgr_shared::auth::jwt::{create_token, validate_token, Claims};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let user_id = Uuid::new_v4();
//! let token = create_token(&Claims::new(user_id), "secret")?;
//!
//! let actor = Actor::User(validate_token(&token, "secret")?.sub);
//! assert_eq!(require_authenticated(&actor)?, user_id);
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod jwt;
pub mod password;
