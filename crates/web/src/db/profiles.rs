//! Profile repository.

use sqlx::SqlitePool;

use mysite_core::{ProfileId, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::Profile;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: ProfileId,
    user_id: UserId,
    bio: String,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            bio: row.bio,
        }
    }
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the profile belonging to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, user_id, bio FROM profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    /// Create a profile for a user that does not have one yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a profile.
    pub async fn create(&self, user_id: UserId, bio: &str) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "INSERT INTO profiles (user_id, bio) VALUES (?, ?) RETURNING id, user_id, bio",
        )
        .bind(user_id)
        .bind(bio)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "profile"))?;

        Ok(row.into())
    }
}
