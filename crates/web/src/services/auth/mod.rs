//! Authentication service.
//!
//! Provides username/password registration and login.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use mysite_core::Username;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account and its profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username is malformed.
    /// Returns `AuthError::PasswordMismatch` or `AuthError::WeakPassword` if
    /// the passwords are rejected.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn register(
        &self,
        username: &str,
        password1: &str,
        password2: &str,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        if password1 != password2 {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password(password1, &username)?;

        let password_hash = hash_password(password1)?;

        let user = self
            .users
            .create_with_profile(&NewUser {
                username: &username,
                password_hash: &password_hash,
                is_staff: false,
                is_superuser: false,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown,
    /// the password is wrong, or the account is inactive.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Ok(username) = Username::parse(username) else {
            return Err(AuthError::InvalidCredentials);
        };

        let (user, password_hash) = self
            .users
            .get_password_hash(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Reject short, all-numeric, or username-equal passwords.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` describing the first failed rule.
pub fn validate_password(password: &str, username: &Username) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "This password is entirely numeric.".to_owned(),
        ));
    }

    if password.eq_ignore_ascii_case(username.as_str()) {
        return Err(AuthError::WeakPassword(
            "The password is too similar to the username.".to_owned(),
        ));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
