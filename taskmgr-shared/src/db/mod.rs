//! Database layer
//!
//! Connection pooling and schema migrations for the PostgreSQL store. The SQL
//! for each entity lives next to its model in [`crate::models`].
//!
//! # Example
//!
//! ```no_run
//! use taskmgr_shared::db::pool::{create_pool, DatabaseConfig};
//! use taskmgr_shared::db::migrations::run_migrations;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig {
//!         url: std::env::var("DATABASE_URL")?,
//!         ..Default::default()
//!     };
//!
//!     let pool = create_pool(config).await?;
//!     run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

pub mod migrations;
pub mod pool;
