//! User accounts: registration, profile updates, login

use tracing::{debug, info};
use uuid::Uuid;

use super::{write_failure, Mutation, ServiceError, ServiceResult, TaskManager};
use crate::auth::authorization::Actor;
use crate::auth::password::{hash_password, verify_password};
use crate::models::{
    user::{User, UserData},
    EntityKind,
};
use crate::validation::forms::UserForm;

impl TaskManager {
    /// Registers a new account; open to anonymous visitors
    ///
    /// # Errors
    ///
    /// `Validation` for bad fields or a taken username
    pub async fn register_user(&self, form: &UserForm) -> ServiceResult<User> {
        let clean = form.clean(&self.config).map_err(|errors| {
            debug!(fields = %errors, "Registration rejected");
            ServiceError::Validation(errors)
        })?;

        let data = UserData {
            username: clean.username,
            first_name: clean.first_name,
            last_name: clean.last_name,
            password_hash: hash_password(&clean.password)?,
        };

        let user = self
            .store
            .insert_user(data)
            .await
            .map_err(|e| write_failure(EntityKind::User, None, e))?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Replaces the actor's own account details, password included
    ///
    /// # Errors
    ///
    /// `Denied(Unauthenticated)`, `NotFound`, `Denied(NotSelf)`, `Validation`
    pub async fn update_user(&self, actor: &Actor, id: Uuid, form: &UserForm) -> ServiceResult<User> {
        self.authorize_mutation(actor, EntityKind::User, id, Mutation::Update)
            .await?;

        let clean = form.clean(&self.config)?;
        let data = UserData {
            username: clean.username,
            first_name: clean.first_name,
            last_name: clean.last_name,
            password_hash: hash_password(&clean.password)?,
        };

        let user = self
            .store
            .update_user(id, data)
            .await
            .map_err(|e| write_failure(EntityKind::User, Some(id), e))?;

        info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// Lists every account; open to anonymous callers
    pub async fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    /// Fetches one account
    pub async fn get_user(&self, id: Uuid) -> ServiceResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or(ServiceError::NotFound {
                kind: EntityKind::User,
                id,
            })
    }

    /// Checks a username and password
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials`
    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<User> {
        let Some(user) = self.store.find_user_by_username(username.trim()).await? else {
            debug!("Login failed: unknown username");
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            debug!(user_id = %user.id, "Login failed: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Turns a verified token subject into the acting identity
    ///
    /// A token outlives the account it was issued for; once the user is
    /// gone the caller is treated as anonymous.
    ///
    /// # Errors
    ///
    /// `Store`
    pub async fn resolve_actor(&self, user_id: Uuid) -> ServiceResult<Actor> {
        match self.store.find_user(user_id).await? {
            Some(user) => Ok(Actor::User(user.id)),
            None => {
                debug!(%user_id, "Token subject no longer exists");
                Ok(Actor::Anonymous)
            }
        }
    }
}
