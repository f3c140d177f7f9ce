//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! mysite-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `MYSITE_DATABASE_URL` - `SQLite` connection string (falls back to `DATABASE_URL`)
//!
//! Migrations live in `crates/web/migrations/`. The session table is created
//! by the session store after the schema migrations.

use thiserror::Error;

use super::{CommandError, connect};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    mysite_web::db::migrate(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
