//! Statuses and labels
//!
//! Both are bare names. Any authenticated user may create, rename or list
//! them; deletes go through [`TaskManager::delete`] and are blocked while a
//! task still uses the entity.

use tracing::info;
use uuid::Uuid;

use super::{write_failure, Mutation, ServiceError, ServiceResult, TaskManager};
use crate::auth::authorization::{require_authenticated, Actor};
use crate::models::{label::Label, status::Status, EntityKind};
use crate::validation::forms::NameForm;

impl TaskManager {
    pub async fn create_status(&self, actor: &Actor, form: &NameForm) -> ServiceResult<Status> {
        require_authenticated(actor)?;
        let name = form.clean()?;

        let status = self
            .store
            .insert_status(&name)
            .await
            .map_err(|e| write_failure(EntityKind::Status, None, e))?;

        info!(status_id = %status.id, name = %status.name, "Status created");
        Ok(status)
    }

    pub async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        form: &NameForm,
    ) -> ServiceResult<Status> {
        self.authorize_mutation(actor, EntityKind::Status, id, Mutation::Update)
            .await?;
        let name = form.clean()?;

        let status = self
            .store
            .update_status(id, &name)
            .await
            .map_err(|e| write_failure(EntityKind::Status, Some(id), e))?;

        info!(status_id = %status.id, "Status updated");
        Ok(status)
    }

    pub async fn list_statuses(&self, actor: &Actor) -> ServiceResult<Vec<Status>> {
        require_authenticated(actor)?;
        Ok(self.store.list_statuses().await?)
    }

    pub async fn get_status(&self, actor: &Actor, id: Uuid) -> ServiceResult<Status> {
        require_authenticated(actor)?;
        self.store
            .find_status(id)
            .await?
            .ok_or(ServiceError::NotFound {
                kind: EntityKind::Status,
                id,
            })
    }

    pub async fn create_label(&self, actor: &Actor, form: &NameForm) -> ServiceResult<Label> {
        require_authenticated(actor)?;
        let name = form.clean()?;

        let label = self
            .store
            .insert_label(&name)
            .await
            .map_err(|e| write_failure(EntityKind::Label, None, e))?;

        info!(label_id = %label.id, name = %label.name, "Label created");
        Ok(label)
    }

    pub async fn update_label(
        &self,
        actor: &Actor,
        id: Uuid,
        form: &NameForm,
    ) -> ServiceResult<Label> {
        self.authorize_mutation(actor, EntityKind::Label, id, Mutation::Update)
            .await?;
        let name = form.clean()?;

        let label = self
            .store
            .update_label(id, &name)
            .await
            .map_err(|e| write_failure(EntityKind::Label, Some(id), e))?;

        info!(label_id = %label.id, "Label updated");
        Ok(label)
    }

    pub async fn list_labels(&self, actor: &Actor) -> ServiceResult<Vec<Label>> {
        require_authenticated(actor)?;
        Ok(self.store.list_labels().await?)
    }

    pub async fn get_label(&self, actor: &Actor, id: Uuid) -> ServiceResult<Label> {
        require_authenticated(actor)?;
        self.store
            .find_label(id)
            .await?
            .ok_or(ServiceError::NotFound {
                kind: EntityKind::Label,
                id,
            })
    }
}
