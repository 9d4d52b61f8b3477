//! Authorization predicates
//!
//! Each predicate is a plain function of the acting identity and, where
//! relevant, the target record. Callers chain them in order:
//! authentication first, then ownership.
//!
//! # Rules
//!
//! - Every mutation requires an authenticated actor (`unauthenticated`)
//! - A user record may only be changed by that user (`not_self`)
//! - A task may only be deleted by its author (`not_author`)
//!
//! # Example
//!
//! ```
//! use taskmgr_shared::auth::authorization::{require_authenticated, require_owner, Actor, AuthzError, Owned};
//! use uuid::Uuid;
//!
//! struct Note { author: Uuid }
//! impl Owned for Note {
//!     fn owner_id(&self) -> Uuid { self.author }
//! }
//!
//! let me = Uuid::new_v4();
//! let note = Note { author: Uuid::new_v4() };
//!
//! let actor_id = require_authenticated(&Actor::User(me)).unwrap();
//! let denied = require_owner(actor_id, &note, AuthzError::NotAuthor);
//! assert_eq!(denied, Err(AuthzError::NotAuthor));
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{task::Task, user::User};

/// The identity making the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Actor {
    /// No valid credentials were presented
    #[default]
    Anonymous,

    /// Authenticated user
    User(Uuid),
}

impl Actor {
    /// The user ID, if authenticated
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Actor::Anonymous => None,
            Actor::User(id) => Some(*id),
        }
    }
}

/// Reasons a mutation is denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No authenticated actor
    #[error("You are not logged in! Please log in.")]
    Unauthenticated,

    /// Actor tried to change another user's account
    #[error("You have no rights to change another user.")]
    NotSelf,

    /// Actor tried to delete a task someone else created
    #[error("The task can be deleted only by its author")]
    NotAuthor,
}

impl AuthzError {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            AuthzError::Unauthenticated => "unauthenticated",
            AuthzError::NotSelf => "not_self",
            AuthzError::NotAuthor => "not_author",
        }
    }
}

/// Records with a single owning user
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

/// A user owns their own account.
impl Owned for User {
    fn owner_id(&self) -> Uuid {
        self.id
    }
}

/// A task is owned by its author, not its executor.
impl Owned for Task {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

/// Returns the actor's user ID
///
/// # Errors
///
/// `AuthzError::Unauthenticated` for an anonymous actor
pub fn require_authenticated(actor: &Actor) -> Result<Uuid, AuthzError> {
    actor.user_id().ok_or(AuthzError::Unauthenticated)
}

/// Allows the action only if `actor_id` owns `record`
///
/// # Errors
///
/// Returns `denial` when the owner differs
pub fn require_owner<R: Owned + ?Sized>(
    actor_id: Uuid,
    record: &R,
    denial: AuthzError,
) -> Result<(), AuthzError> {
    if record.owner_id() != actor_id {
        return Err(denial);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task_by(author_id: Uuid, executor_id: Uuid) -> Task {
        Task {
            id: Uuid::new_v4(),
            name: "t".to_string(),
            description: String::new(),
            status_id: Uuid::new_v4(),
            author_id,
            executor_id,
            label_ids: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_anonymous_is_unauthenticated() {
        assert_eq!(
            require_authenticated(&Actor::Anonymous),
            Err(AuthzError::Unauthenticated)
        );
        assert_eq!(Actor::default(), Actor::Anonymous);
    }

    #[test]
    fn test_authenticated_yields_id() {
        let id = Uuid::new_v4();
        assert_eq!(require_authenticated(&Actor::User(id)), Ok(id));
    }

    #[test]
    fn test_task_owner_is_author_not_executor() {
        let author = Uuid::new_v4();
        let executor = Uuid::new_v4();
        let task = task_by(author, executor);

        assert!(require_owner(author, &task, AuthzError::NotAuthor).is_ok());
        assert_eq!(
            require_owner(executor, &task, AuthzError::NotAuthor),
            Err(AuthzError::NotAuthor)
        );
    }

    #[test]
    fn test_user_owns_own_account() {
        let user = User {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(require_owner(user.id, &user, AuthzError::NotSelf).is_ok());
        assert_eq!(
            require_owner(Uuid::new_v4(), &user, AuthzError::NotSelf),
            Err(AuthzError::NotSelf)
        );
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(AuthzError::Unauthenticated.code(), "unauthenticated");
        assert_eq!(AuthzError::NotSelf.code(), "not_self");
        assert_eq!(AuthzError::NotAuthor.code(), "not_author");
        assert_eq!(
            AuthzError::NotAuthor.to_string(),
            "The task can be deleted only by its author"
        );
    }
}
