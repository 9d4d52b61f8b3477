//! Application state and router builder
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskmgr_api::{app::{build_router, AppState}, config::Config};
//! use taskmgr_shared::store::memory::MemoryStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let state = AppState::new(Arc::new(MemoryStore::new()), None, config);
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskmgr_shared::{
    auth::{
        authorization::{require_authenticated, Actor},
        jwt,
    },
    manager::TaskManager,
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Rule layer over the configured store
    pub manager: Arc<TaskManager>,

    /// Database pool, when running on PostgreSQL
    pub db: Option<PgPool>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, db: Option<PgPool>, config: Config) -> Self {
        let manager = TaskManager::new(store, config.validation);

        Self {
            manager: Arc::new(manager),
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                   # Health check (public)
/// └── /v1/                      # API v1, actor resolved from the bearer token
///     ├── /session/
///     │   ├── POST /login
///     │   └── POST /logout
///     ├── /users/               # list and register are public
///     │   ├── GET  POST  /
///     │   └── GET  PUT  DELETE /:id
///     ├── /statuses/            # login required
///     ├── /labels/              # login required
///     └── /tasks/               # login required; GET / takes filter params
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Actor resolution (v1 routes)
/// 4. Login gate (statuses, labels, tasks, user update and delete)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let session_routes = Router::new()
        .route("/login", post(routes::session::login))
        .route("/logout", post(routes::session::logout));

    let user_routes = Router::new()
        .route(
            "/",
            get(routes::users::list_users).post(routes::users::register_user),
        )
        .route(
            "/:id",
            get(routes::users::get_user).merge(
                put(routes::users::update_user)
                    .merge(delete(routes::users::delete_user))
                    .route_layer(axum::middleware::from_fn(require_login)),
            ),
        );

    let status_routes = Router::new()
        .route(
            "/",
            get(routes::statuses::list_statuses).post(routes::statuses::create_status),
        )
        .route(
            "/:id",
            get(routes::statuses::get_status)
                .put(routes::statuses::update_status)
                .delete(routes::statuses::delete_status),
        )
        .route_layer(axum::middleware::from_fn(require_login));

    let label_routes = Router::new()
        .route(
            "/",
            get(routes::labels::list_labels).post(routes::labels::create_label),
        )
        .route(
            "/:id",
            get(routes::labels::get_label)
                .put(routes::labels::update_label)
                .delete(routes::labels::delete_label),
        )
        .route_layer(axum::middleware::from_fn(require_login));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(axum::middleware::from_fn(require_login));

    let v1_routes = Router::new()
        .nest("/session", session_routes)
        .nest("/users", user_routes)
        .nest("/statuses", status_routes)
        .nest("/labels", label_routes)
        .nest("/tasks", task_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            actor_layer,
        ));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Actor resolution middleware
///
/// Requests without an Authorization header run as [`Actor::Anonymous`];
/// the rule layer decides what an anonymous actor may do. A header that is
/// present but malformed, expired or forged is rejected outright. A valid
/// token whose account has since been deleted also runs as anonymous.
async fn actor_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let actor = match req.headers().get(header::AUTHORIZATION) {
        None => Actor::Anonymous,
        Some(value) => {
            let token = value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

            let claims = jwt::validate_token(token, state.jwt_secret())?;
            state.manager.resolve_actor(claims.sub).await?
        }
    };

    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}

/// Login gate for routes that never serve anonymous callers
///
/// Runs after [`actor_layer`] and before the handler's extractors, so an
/// anonymous request is refused before its body, path or query is parsed.
async fn require_login(req: Request, next: Next) -> Result<Response, ApiError> {
    let actor = req.extensions().get::<Actor>().copied().unwrap_or_default();
    require_authenticated(&actor)?;

    Ok(next.run(req).await)
}
