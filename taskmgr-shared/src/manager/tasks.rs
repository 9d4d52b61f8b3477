//! Tasks: create, update, detail view and the filtered list

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::{write_failure, Mutation, ServiceError, ServiceResult, TaskManager};
use crate::auth::authorization::{require_authenticated, Actor};
use crate::filter::TaskFilter;
use crate::models::{label::Label, status::Status, task::Task, user::User, EntityKind};
use crate::validation::forms::TaskForm;

/// A task with its references resolved, for the detail view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub status: Status,
    pub author: User,
    pub executor: User,
    pub labels: Vec<Label>,
}

impl TaskManager {
    /// Creates a task authored by the actor
    ///
    /// The author always comes from the actor, never from the form.
    ///
    /// # Errors
    ///
    /// `Denied(Unauthenticated)` or `Validation` (missing fields, duplicate
    /// name, unknown status/executor/labels)
    pub async fn create_task(&self, actor: &Actor, form: &TaskForm) -> ServiceResult<Task> {
        let author_id = require_authenticated(actor)?;
        let data = form.clean()?;

        let task = self
            .store
            .insert_task(author_id, data)
            .await
            .map_err(|e| write_failure(EntityKind::Task, None, e))?;

        info!(task_id = %task.id, %author_id, "Task created");
        Ok(task)
    }

    /// Replaces a task's fields; any authenticated user may edit any task
    ///
    /// The author is left unchanged.
    pub async fn update_task(&self, actor: &Actor, id: Uuid, form: &TaskForm) -> ServiceResult<Task> {
        self.authorize_mutation(actor, EntityKind::Task, id, Mutation::Update)
            .await?;
        let data = form.clean()?;

        let task = self
            .store
            .update_task(id, data)
            .await
            .map_err(|e| write_failure(EntityKind::Task, Some(id), e))?;

        info!(task_id = %task.id, "Task updated");
        Ok(task)
    }

    /// Loads a task with its status, author, executor and labels
    pub async fn task_detail(&self, actor: &Actor, id: Uuid) -> ServiceResult<TaskDetail> {
        require_authenticated(actor)?;
        let task = self
            .store
            .find_task(id)
            .await?
            .ok_or(ServiceError::NotFound {
                kind: EntityKind::Task,
                id,
            })?;

        let status = self.store.find_status(task.status_id).await?;
        let author = self.store.find_user(task.author_id).await?;
        let executor = self.store.find_user(task.executor_id).await?;
        let labels = self
            .store
            .list_labels()
            .await?
            .into_iter()
            .filter(|l| task.label_ids.contains(&l.id))
            .collect();

        // Restrict constraints keep these present; a miss means a concurrent
        // write slipped between the reads.
        match (status, author, executor) {
            (Some(status), Some(author), Some(executor)) => Ok(TaskDetail {
                task,
                status,
                author,
                executor,
                labels,
            }),
            _ => Err(ServiceError::NotFound {
                kind: EntityKind::Task,
                id,
            }),
        }
    }

    /// Lists tasks narrowed by `filter`, oldest first
    ///
    /// # Errors
    ///
    /// `Denied(Unauthenticated)` or `Store`
    pub async fn filter_tasks(&self, actor: &Actor, filter: &TaskFilter) -> ServiceResult<Vec<Task>> {
        let actor_id = require_authenticated(actor)?;
        let tasks = self.store.list_tasks(&filter.to_query(actor_id)).await?;

        debug!(?filter, count = tasks.len(), "Tasks listed");
        Ok(tasks)
    }
}
