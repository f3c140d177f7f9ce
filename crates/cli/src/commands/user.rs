//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a staff user
//! mysite-cli user create alice --password 'correct horse' --staff
//!
//! # Grant a permission
//! mysite-cli user grant alice accounts.view_profile
//! ```
//!
//! # Environment Variables
//!
//! - `MYSITE_DATABASE_URL` - `SQLite` connection string
//! - `MYSITE_USER_PASSWORD` - Password for `user create` when `--password` is omitted

use mysite_core::{Permission, PermissionError, Username, UsernameError};
use mysite_web::db::{RepositoryError, UserRepository};
use mysite_web::models::NewUser;
use mysite_web::services::auth::{AuthError, hash_password, validate_password};
use thiserror::Error;

use super::{CommandError, connect};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Missing password: pass --password or set MYSITE_USER_PASSWORD")]
    MissingPassword,

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error(transparent)]
    InvalidPermission(#[from] PermissionError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("No such user: {0}")]
    UnknownUser(String),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Create a user and their empty profile.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError` if the input is invalid or the username is taken.
pub async fn create(
    username: &str,
    password: Option<String>,
    is_staff: bool,
    is_superuser: bool,
) -> Result<i64, UserError> {
    let username = Username::parse(username)?;
    let password = password
        .or_else(|| std::env::var("MYSITE_USER_PASSWORD").ok())
        .ok_or(UserError::MissingPassword)?;
    validate_password(&password, &username)?;
    let password_hash = hash_password(&password)?;

    let pool = connect().await?;

    tracing::info!("Creating user: {}", username);

    let user = UserRepository::new(&pool)
        .create_with_profile(&NewUser {
            username: &username,
            password_hash: &password_hash,
            is_staff,
            is_superuser,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(username.to_string()),
            other => UserError::Repository(other),
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Staff: {}, Superuser: {}",
        user.id,
        user.username,
        user.is_staff,
        user.is_superuser
    );

    Ok(user.id.get())
}

/// Grant a permission to an existing user.
///
/// # Errors
///
/// Returns `UserError` if the user or permission is unknown.
pub async fn grant(username: &str, permission: &str) -> Result<(), UserError> {
    let username = Username::parse(username)?;
    let permission: Permission = permission.parse()?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_username(&username)
        .await?
        .ok_or_else(|| UserError::UnknownUser(username.to_string()))?;

    users.grant(user.id, permission).await?;
    tracing::info!("Granted {} to {}", permission, user.username);

    Ok(())
}
