//! # Toolbox DB
//!
//! Database pool and migrations for the Toolbox API.
//!
//! This crate provides PostgreSQL connection pool initialization using SQLx
//! and the embedded schema migrations for roles and permissions.
//!
//! # Example
//!
//! ```ignore
//! use toolbox_config::DatabaseConfig;
//! use toolbox_db::{init_db_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sqlx::Error> {
//!     let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//!     run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::postgres::PgPoolOptions;
use toolbox_config::DatabaseConfig;
use tracing::info;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Initializes a PostgreSQL connection pool.
///
/// The pool is cheaply cloneable and should be created once at startup and
/// shared through the application state.
///
/// # Errors
///
/// Returns [`sqlx::Error::Configuration`] if no `DATABASE_URL` is configured,
/// or the connection error if the database cannot be reached.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let database_url = config
        .url
        .as_deref()
        .ok_or_else(|| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await?;

    info!(
        max_connections = config.max_connections,
        "Database pool initialized"
    );

    Ok(pool)
}

/// Applies the embedded migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
