//! Label endpoints (login required)
//!
//! A label attached to any task cannot be deleted.

use super::{Deleted, Listing, Saved};
use crate::{app::AppState, error::ApiResult, extract::{JsonBody, PathParam}};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use taskmgr_shared::{
    auth::authorization::Actor,
    manager::{Record, Submission},
    models::{label::Label, EntityKind},
    validation::forms::NameForm,
};
use uuid::Uuid;

pub const CREATED: &str = "Label successfully created";
pub const CHANGED: &str = "Label successfully changed";
pub const DELETED: &str = "Label successfully deleted";

pub async fn list_labels(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Listing<Label>>> {
    let labels = state.manager.list_labels(&actor).await?;
    Ok(Json(labels.into()))
}

pub async fn get_label(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<Label>> {
    Ok(Json(state.manager.get_label(&actor, id).await?))
}

/// Creation goes through the generic submission entry point
pub async fn create_label(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    JsonBody(form): JsonBody<NameForm>,
) -> ApiResult<(StatusCode, Json<Saved<Record>>)> {
    let record = state
        .manager
        .validate_and_create(&actor, &Submission::Label(form))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Saved {
            message: CREATED,
            data: record,
        }),
    ))
}

pub async fn update_label(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(form): JsonBody<NameForm>,
) -> ApiResult<Json<Saved<Record>>> {
    let record = state
        .manager
        .validate_and_update(&actor, id, &Submission::Label(form))
        .await?;

    Ok(Json(Saved {
        message: CHANGED,
        data: record,
    }))
}

pub async fn delete_label(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<Deleted>> {
    state.manager.delete(&actor, EntityKind::Label, id).await?;
    Ok(Json(Deleted { message: DELETED }))
}
