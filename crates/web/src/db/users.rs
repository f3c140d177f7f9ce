//! User repository for database operations.
//!
//! Covers accounts, their password hashes and their permission grants.

use std::collections::BTreeSet;

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::SqlitePool;

use mysite_core::{Permission, UserId, Username};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str =
    "id, username, first_name, last_name, email, is_active, is_staff, is_superuser, date_joined";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    date_joined: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_active: row.is_active,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            date_joined: row.date_joined,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserWithPasswordRow {
    #[sqlx(flatten)]
    user: UserRow,
    password: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored username is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// List every user, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user together with their stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithPasswordRow>(&format!(
            "SELECT {USER_COLUMNS}, password FROM users WHERE username = ?"
        ))
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| User::try_from(r.user).map(|user| (user, r.password)))
            .transpose()
    }

    /// Insert a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser<'_>) -> Result<User, RepositoryError> {
        let row = insert_user(self.pool, user).await?;
        User::try_from(row)
    }

    /// Insert a user and their empty profile in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_profile(&self, user: &NewUser<'_>) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = insert_user(&mut *tx, user).await?;

        sqlx::query("INSERT INTO profiles (user_id, bio) VALUES (?, '')")
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        User::try_from(row)
    }

    /// Permissions explicitly granted to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if an unknown codename is stored.
    pub async fn permissions(&self, id: UserId) -> Result<BTreeSet<Permission>, RepositoryError> {
        let codenames: Vec<String> =
            sqlx::query_scalar("SELECT permission FROM user_permissions WHERE user_id = ?")
                .bind(id)
                .fetch_all(self.pool)
                .await?;

        codenames
            .iter()
            .map(|c| {
                c.parse::<Permission>().map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid permission in database: {e}"))
                })
            })
            .collect()
    }

    /// Grant a permission. Granting twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn grant(&self, id: UserId, permission: Permission) -> Result<(), RepositoryError> {
        if self.get_by_id(id).await?.is_none() {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("INSERT OR IGNORE INTO user_permissions (user_id, permission) VALUES (?, ?)")
            .bind(id)
            .bind(permission.codename())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

async fn insert_user<'e, E>(executor: E, user: &NewUser<'_>) -> Result<UserRow, RepositoryError>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, UserRow>(&format!(
        r"
        INSERT INTO users (username, password, is_staff, is_superuser, date_joined)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {USER_COLUMNS}
        "
    ))
    .bind(user.username.as_str())
    .bind(user.password_hash)
    .bind(user.is_staff)
    .bind(user.is_superuser)
    .bind(Utc::now().trunc_subsecs(6))
    .fetch_one(executor)
    .await
    .map_err(|e| conflict_on_unique(e, "username"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support;

    fn new_user(username: &Username) -> NewUser<'_> {
        NewUser {
            username,
            password_hash: "not-a-real-hash",
            is_staff: false,
            is_superuser: false,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);
        let name = Username::parse("alice").unwrap();

        let user = repo.create(&new_user(&name)).await.unwrap();
        assert!(user.is_active);
        assert!(!user.is_staff);

        let by_id = repo.get_by_id(user.id).await.unwrap().unwrap();
        let by_name = repo.get_by_username(&name).await.unwrap().unwrap();
        assert_eq!(by_id, user);
        assert_eq!(by_name, user);

        let (with_hash, hash) = repo.get_password_hash(&name).await.unwrap().unwrap();
        assert_eq!(with_hash.id, user.id);
        assert_eq!(hash, "not-a-real-hash");
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);
        let name = Username::parse("bob").unwrap();

        repo.create(&new_user(&name)).await.unwrap();
        let err = repo.create(&new_user(&name)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_with_profile() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);
        let name = Username::parse("carol").unwrap();

        let user = repo.create_with_profile(&new_user(&name)).await.unwrap();
        let profile = crate::db::ProfileRepository::new(&pool)
            .get_by_user(user.id)
            .await
            .unwrap();
        assert!(profile.is_some());
    }

    #[tokio::test]
    async fn test_grant_and_read_permissions() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);
        let name = Username::parse("dave").unwrap();
        let user = repo.create(&new_user(&name)).await.unwrap();

        assert!(repo.permissions(user.id).await.unwrap().is_empty());

        repo.grant(user.id, Permission::ViewOrder).await.unwrap();
        repo.grant(user.id, Permission::ViewOrder).await.unwrap();
        repo.grant(user.id, Permission::ViewProfile).await.unwrap();

        let perms = repo.permissions(user.id).await.unwrap();
        assert_eq!(
            perms,
            BTreeSet::from([Permission::ViewOrder, Permission::ViewProfile])
        );
    }

    #[tokio::test]
    async fn test_grant_to_missing_user() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);
        let err = repo
            .grant(UserId::new(77), Permission::ViewOrder)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
