//! Task endpoints (login required)
//!
//! # Filtering
//!
//! ```text
//! GET /v1/tasks?status=<uuid>&executor=<uuid>&labels=<uuid>&own_tasks=on
//! ```
//!
//! Blank parameters are ignored and the rest are ANDed. `own_tasks` keeps
//! the tasks the caller authored.
//!
//! # Ownership
//!
//! Any logged-in user may edit a task; only its author may delete it.

use super::{Deleted, Listing, Saved};
use crate::{app::AppState, error::ApiResult, extract::{JsonBody, PathParam, QueryParams}};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use taskmgr_shared::{
    auth::authorization::Actor,
    filter::TaskFilter,
    manager::TaskDetail,
    models::{task::Task, EntityKind},
    validation::forms::TaskForm,
};
use uuid::Uuid;

pub const CREATED: &str = "Task successfully created";
pub const CHANGED: &str = "Task successfully changed";
pub const DELETED: &str = "Task successfully deleted";

/// `GET /v1/tasks`
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    QueryParams(filter): QueryParams<TaskFilter>,
) -> ApiResult<Json<Listing<Task>>> {
    let tasks = state.manager.filter_tasks(&actor, &filter).await?;
    Ok(Json(tasks.into()))
}

/// `GET /v1/tasks/:id` with status, author, executor and labels resolved
pub async fn get_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<TaskDetail>> {
    Ok(Json(state.manager.task_detail(&actor, id).await?))
}

/// `POST /v1/tasks`
///
/// # Request
///
/// ```json
/// {
///   "name": "Write report",
///   "description": "",
///   "status": "<status uuid>",
///   "executor": "<user uuid>",
///   "labels": ["<label uuid>"]
/// }
/// ```
///
/// The author is always the caller.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    JsonBody(form): JsonBody<TaskForm>,
) -> ApiResult<(StatusCode, Json<Saved<Task>>)> {
    let task = state.manager.create_task(&actor, &form).await?;

    Ok((
        StatusCode::CREATED,
        Json(Saved {
            message: CREATED,
            data: task,
        }),
    ))
}

/// `PUT /v1/tasks/:id`
pub async fn update_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(form): JsonBody<TaskForm>,
) -> ApiResult<Json<Saved<Task>>> {
    let task = state.manager.update_task(&actor, id, &form).await?;

    Ok(Json(Saved {
        message: CHANGED,
        data: task,
    }))
}

/// `DELETE /v1/tasks/:id`, author only
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<Deleted>> {
    state.manager.delete(&actor, EntityKind::Task, id).await?;
    Ok(Json(Deleted { message: DELETED }))
}
