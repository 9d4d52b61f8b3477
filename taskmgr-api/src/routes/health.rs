//! Health check endpoint
//!
//! ```text
//! GET /health
//! ```
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0",
//!   "database": "connected"
//! }
//! ```
//!
//! `database` is `not_configured` when the server runs on the in-memory
//! store.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::Serialize;
use taskmgr_shared::db::pool;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,

    /// Application version
    pub version: &'static str,

    /// Database status
    pub database: &'static str,
}

/// Reports service health including database connectivity
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database = match &state.db {
        None => "not_configured",
        Some(db) => match pool::health_check(db).await {
            Ok(()) => "connected",
            Err(_) => "disconnected",
        },
    };

    Ok(Json(HealthResponse {
        status: if database == "disconnected" {
            "degraded"
        } else {
            "healthy"
        },
        version: env!("CARGO_PKG_VERSION"),
        database,
    }))
}
