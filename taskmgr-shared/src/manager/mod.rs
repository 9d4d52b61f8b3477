//! Rule layer entry point
//!
//! [`TaskManager`] is what request handlers call. Every mutation runs the
//! same chain:
//!
//! 1. authentication ([`require_authenticated`])
//! 2. target lookup (`NotFound`)
//! 3. ownership ([`require_owner`]) where the entity has an owner
//! 4. form cleaning ([`crate::validation::forms`])
//! 5. the store write, whose constraint failures become field errors or a
//!    blocked delete
//!
//! The generic operations ([`TaskManager::validate_and_create`],
//! [`TaskManager::validate_and_update`], [`TaskManager::authorize_mutation`],
//! [`TaskManager::delete`], [`TaskManager::filter_tasks`]) dispatch on
//! [`EntityKind`] to the typed methods in the submodules.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use taskmgr_shared::auth::authorization::Actor;
//! use taskmgr_shared::manager::TaskManager;
//! use taskmgr_shared::store::memory::MemoryStore;
//! use taskmgr_shared::validation::{forms::NameForm, ValidationConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = TaskManager::new(Arc::new(MemoryStore::new()), ValidationConfig::default());
//!
//! let denied = manager
//!     .create_status(&Actor::Anonymous, &NameForm { name: "new".to_string() })
//!     .await;
//! assert!(denied.is_err());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::authorization::{require_authenticated, require_owner, Actor, AuthzError};
use crate::auth::password::PasswordError;
use crate::models::{label::Label, status::Status, task::Task, user::User, EntityKind};
use crate::protection::{self, DeleteError, ProtectionError};
use crate::store::{Store, StoreError};
use crate::validation::{
    forms::{NameForm, TaskForm, UserForm},
    FieldErrors, ValidationConfig,
};

mod catalog;
mod tasks;
mod users;

pub use tasks::TaskDetail;

/// Message shown for a failed login
pub const INVALID_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Errors surfaced to the request-handling layer
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The submission failed field checks; nothing was written
    #[error("{0}")]
    Validation(FieldErrors),

    /// The actor may not perform the operation; nothing was written
    #[error(transparent)]
    Denied(#[from] AuthzError),

    /// Delete refused because the entity is referenced
    #[error(transparent)]
    Blocked(ProtectionError),

    /// Target does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    /// Login failed
    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,

    /// Password hashing failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

/// Result type for rule-layer operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// A create or update submission for any entity
#[derive(Debug, Clone)]
pub enum Submission {
    User(UserForm),
    Status(NameForm),
    Label(NameForm),
    Task(TaskForm),
}

impl Submission {
    pub fn kind(&self) -> EntityKind {
        match self {
            Submission::User(_) => EntityKind::User,
            Submission::Status(_) => EntityKind::Status,
            Submission::Label(_) => EntityKind::Label,
            Submission::Task(_) => EntityKind::Task,
        }
    }
}

/// A stored record of any entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    User(User),
    Status(Status),
    Label(Label),
    Task(Task),
}

impl Record {
    pub fn id(&self) -> Uuid {
        match self {
            Record::User(r) => r.id,
            Record::Status(r) => r.id,
            Record::Label(r) => r.id,
            Record::Task(r) => r.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Record::User(_) => EntityKind::User,
            Record::Status(_) => EntityKind::Status,
            Record::Label(_) => EntityKind::Label,
            Record::Task(_) => EntityKind::Task,
        }
    }
}

/// The kind of change being authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutation {
    Update,
    Delete,
}

/// Rule layer over a [`Store`]
///
/// Holds no per-request state; clone the `Arc` and share it across handlers.
#[derive(Clone)]
pub struct TaskManager {
    store: Arc<dyn Store>,
    config: ValidationConfig,
}

impl std::fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TaskManager {
    pub fn new(store: Arc<dyn Store>, config: ValidationConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validates a submission and creates the record
    ///
    /// User registration is open to anonymous actors; every other kind
    /// requires authentication.
    ///
    /// # Errors
    ///
    /// `Denied`, `Validation` or `Store`
    pub async fn validate_and_create(
        &self,
        actor: &Actor,
        submission: &Submission,
    ) -> ServiceResult<Record> {
        Ok(match submission {
            Submission::User(form) => Record::User(self.register_user(form).await?),
            Submission::Status(form) => Record::Status(self.create_status(actor, form).await?),
            Submission::Label(form) => Record::Label(self.create_label(actor, form).await?),
            Submission::Task(form) => Record::Task(self.create_task(actor, form).await?),
        })
    }

    /// Authorizes, validates and replaces an existing record
    ///
    /// # Errors
    ///
    /// `Denied`, `NotFound`, `Validation` or `Store`
    pub async fn validate_and_update(
        &self,
        actor: &Actor,
        id: Uuid,
        submission: &Submission,
    ) -> ServiceResult<Record> {
        Ok(match submission {
            Submission::User(form) => Record::User(self.update_user(actor, id, form).await?),
            Submission::Status(form) => {
                Record::Status(self.update_status(actor, id, form).await?)
            }
            Submission::Label(form) => Record::Label(self.update_label(actor, id, form).await?),
            Submission::Task(form) => Record::Task(self.update_task(actor, id, form).await?),
        })
    }

    /// Decides whether `actor` may apply `mutation` to the record
    ///
    /// Authentication is checked before the record is looked up, so an
    /// anonymous actor learns nothing about which IDs exist.
    ///
    /// # Errors
    ///
    /// `Denied` with the reason, or `NotFound`
    pub async fn authorize_mutation(
        &self,
        actor: &Actor,
        kind: EntityKind,
        id: Uuid,
        mutation: Mutation,
    ) -> ServiceResult<()> {
        let actor_id = require_authenticated(actor)?;
        let not_found = || ServiceError::NotFound { kind, id };

        let verdict = match kind {
            EntityKind::User => {
                let user = self.store.find_user(id).await?.ok_or_else(not_found)?;
                require_owner(actor_id, &user, AuthzError::NotSelf)
            }
            EntityKind::Task => {
                let task = self.store.find_task(id).await?.ok_or_else(not_found)?;
                match mutation {
                    Mutation::Delete => require_owner(actor_id, &task, AuthzError::NotAuthor),
                    Mutation::Update => Ok(()),
                }
            }
            EntityKind::Status => {
                self.store.find_status(id).await?.ok_or_else(not_found)?;
                Ok(())
            }
            EntityKind::Label => {
                self.store.find_label(id).await?.ok_or_else(not_found)?;
                Ok(())
            }
        };

        if let Err(reason) = verdict {
            warn!(
                %actor_id,
                kind = %kind,
                %id,
                reason = reason.code(),
                "Mutation denied"
            );
        }
        verdict.map_err(ServiceError::Denied)
    }

    /// Authorizes and deletes a record
    ///
    /// Statuses, labels and users referenced by a task are left intact and
    /// reported as `Blocked`.
    ///
    /// # Errors
    ///
    /// `Denied`, `NotFound`, `Blocked` or `Store`
    pub async fn delete(&self, actor: &Actor, kind: EntityKind, id: Uuid) -> ServiceResult<()> {
        self.authorize_mutation(actor, kind, id, Mutation::Delete)
            .await?;

        match protection::delete_protected(self.store.as_ref(), kind, id).await {
            Ok(()) => {
                info!(kind = %kind, %id, "Deleted");
                Ok(())
            }
            Err(DeleteError::Blocked(e)) => Err(ServiceError::Blocked(e)),
            Err(DeleteError::NotFound) => Err(ServiceError::NotFound { kind, id }),
            Err(DeleteError::Store(e)) => Err(ServiceError::Store(e)),
        }
    }
}

/// Folds a failed store write into the matching service error
fn write_failure(kind: EntityKind, id: Option<Uuid>, err: StoreError) -> ServiceError {
    match FieldErrors::from_store(kind, err) {
        Ok(errors) => ServiceError::Validation(errors),
        Err(StoreError::NotFound) => ServiceError::NotFound {
            kind,
            id: id.unwrap_or_default(),
        },
        Err(other) => ServiceError::Store(other),
    }
}
