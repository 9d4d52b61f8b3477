//! User endpoints
//!
//! Listing, viewing and registering are public. Updating and deleting are
//! limited to the account itself, and a user still named on a task cannot
//! be deleted.

use super::{Deleted, Listing, Saved};
use crate::{app::AppState, error::ApiResult, extract::{JsonBody, PathParam}};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use taskmgr_shared::{
    auth::authorization::Actor,
    models::{user::User, EntityKind},
    validation::forms::UserForm,
};
use uuid::Uuid;

pub const REGISTERED: &str = "User is successfully registered";
pub const UPDATED: &str = "User is successfully updated";
pub const DELETED: &str = "User is successfully deleted";

/// `GET /v1/users`
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Listing<User>>> {
    let users = state.manager.list_users().await?;
    Ok(Json(users.into()))
}

/// `GET /v1/users/:id`
pub async fn get_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.manager.get_user(id).await?))
}

/// `POST /v1/users`
///
/// # Request
///
/// ```json
/// {
///   "username": "jdoe",
///   "first_name": "John",
///   "last_name": "Doe",
///   "password1": "secret-pass",
///   "password2": "secret-pass"
/// }
/// ```
///
/// # Errors
///
/// 422 with per-field details when the form is incomplete, the username is
/// malformed or taken, or the passwords disagree.
pub async fn register_user(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<UserForm>,
) -> ApiResult<(StatusCode, Json<Saved<User>>)> {
    let user = state.manager.register_user(&form).await?;

    Ok((
        StatusCode::CREATED,
        Json(Saved {
            message: REGISTERED,
            data: user,
        }),
    ))
}

/// `PUT /v1/users/:id`
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(form): JsonBody<UserForm>,
) -> ApiResult<Json<Saved<User>>> {
    let user = state.manager.update_user(&actor, id, &form).await?;

    Ok(Json(Saved {
        message: UPDATED,
        data: user,
    }))
}

/// `DELETE /v1/users/:id`
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<Deleted>> {
    state.manager.delete(&actor, EntityKind::User, id).await?;
    Ok(Json(Deleted { message: DELETED }))
}
