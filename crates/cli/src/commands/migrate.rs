//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! stackfood-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STACKFOOD_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/web/migrations/` and are embedded at compile
//! time:
//! ```text
//! migrations/
//! └── 20260101000001_create_account.sql
//! ```

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use stackfood_web::config::{ConfigError, database_url_from_env};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the account database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the database cannot be
/// reached, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    pool.close().await;
    tracing::info!("Migrations complete!");
    Ok(())
}
