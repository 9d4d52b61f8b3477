//! Status endpoints (login required)

use super::{Deleted, Listing, Saved};
use crate::{app::AppState, error::ApiResult, extract::{JsonBody, PathParam}};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use taskmgr_shared::{
    auth::authorization::Actor,
    models::{status::Status, EntityKind},
    validation::forms::NameForm,
};
use uuid::Uuid;

pub const CREATED: &str = "Status successfully created";
pub const CHANGED: &str = "Status successfully changed";
pub const DELETED: &str = "Status successfully deleted";

pub async fn list_statuses(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Listing<Status>>> {
    let statuses = state.manager.list_statuses(&actor).await?;
    Ok(Json(statuses.into()))
}

pub async fn get_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<Status>> {
    Ok(Json(state.manager.get_status(&actor, id).await?))
}

pub async fn create_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    JsonBody(form): JsonBody<NameForm>,
) -> ApiResult<(StatusCode, Json<Saved<Status>>)> {
    let status = state.manager.create_status(&actor, &form).await?;

    Ok((
        StatusCode::CREATED,
        Json(Saved {
            message: CREATED,
            data: status,
        }),
    ))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(form): JsonBody<NameForm>,
) -> ApiResult<Json<Saved<Status>>> {
    let status = state.manager.update_status(&actor, id, &form).await?;

    Ok(Json(Saved {
        message: CHANGED,
        data: status,
    }))
}

/// Refused with 409 while any task carries the status
pub async fn delete_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<Deleted>> {
    state.manager.delete(&actor, EntityKind::Status, id).await?;
    Ok(Json(Deleted { message: DELETED }))
}
