//! Login and logout
//!
//! Sessions are bearer tokens. Logging out is client-side: the token is
//! simply discarded, so `logout` only confirms.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::JsonBody,
};
use axum::{extract::State, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use taskmgr_shared::{
    auth::jwt::{create_token, Claims},
    models::user::User,
};

pub const LOGGED_IN: &str = "You are logged in";
pub const LOGGED_OUT: &str = "You are logged out";

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,

    /// Bearer token for the Authorization header
    pub access_token: String,

    pub token_type: &'static str,

    /// Token lifetime in seconds
    pub expires_in: i64,

    pub user: User,
}

/// Response for logout
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

/// Exchanges credentials for an access token
///
/// # Errors
///
/// 401 with the generic credentials message for an unknown username or a
/// wrong password.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .manager
        .authenticate(&req.username, &req.password)
        .await?;

    let ttl = Duration::try_hours(state.config.jwt.ttl_hours).ok_or_else(|| {
        ApiError::InternalError(format!(
            "token lifetime of {} hours is out of range",
            state.config.jwt.ttl_hours
        ))
    })?;
    let claims = Claims::with_expiration(user.id, ttl);
    let access_token = create_token(&claims, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        message: LOGGED_IN,
        access_token,
        token_type: "Bearer",
        expires_in: ttl.num_seconds(),
        user,
    }))
}

/// Confirms logout
pub async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        message: LOGGED_OUT,
    })
}
