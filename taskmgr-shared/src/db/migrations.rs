//! Schema migrations
//!
//! Migrations live in `migrations/` at the workspace root as reversible
//! `{version}_{name}.up.sql` / `{version}_{name}.down.sql` pairs and are
//! embedded into the binary at compile time.

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Applies every pending migration
///
/// # Errors
///
/// Returns an error if a migration fails; sqlx rolls that migration back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}

/// Number of successfully applied migrations, or 0 before the first run
///
/// # Errors
///
/// Returns an error if the migrations table cannot be queried
pub async fn applied_migrations(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(0);
    }

    sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
}

/// Creates the database named in the URL if it is missing
///
/// Meant for development and test setups.
///
/// # Errors
///
/// Returns an error if the server is unreachable or creation is not permitted
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    }

    Ok(())
}
