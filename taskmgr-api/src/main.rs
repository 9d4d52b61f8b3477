//! # Task Manager API Server
//!
//! Users, statuses, labels and tasks over a JSON API.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) DATABASE_URL=postgres://... cargo run -p taskmgr-api
//! ```
//!
//! Without `DATABASE_URL` the server keeps everything in memory.

use sqlx::PgPool;
use std::sync::Arc;

use taskmgr_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskmgr_shared::{
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    store::{memory::MemoryStore, postgres::PgStore, Store},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskmgr_api=debug,taskmgr_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Task Manager API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let (store, db): (Arc<dyn Store>, Option<PgPool>) = match &config.database.url {
        Some(url) => {
            let pool = create_pool(DatabaseConfig {
                url: url.clone(),
                max_connections: config.database.max_connections,
                ..Default::default()
            })
            .await?;
            run_migrations(&pool).await?;

            let store: Arc<dyn Store> = Arc::new(PgStore::new(pool.clone()));
            (store, Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
            (store, None)
        }
    };

    let address = config.bind_address();
    let app = build_router(AppState::new(store, db, config));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, exiting...");
}
