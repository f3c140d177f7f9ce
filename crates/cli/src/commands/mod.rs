//! Subcommand implementations.

pub mod fixtures;
pub mod migrate;
pub mod user;

use secrecy::SecretString;
use sqlx::SqlitePool;
use thiserror::Error;

/// Errors shared by every command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect using `MYSITE_DATABASE_URL` (or `DATABASE_URL`).
///
/// # Errors
///
/// Returns `CommandError` if no URL is set or the connection fails.
pub async fn connect() -> Result<SqlitePool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("MYSITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("MYSITE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(mysite_web::db::create_pool(&database_url).await?)
}
