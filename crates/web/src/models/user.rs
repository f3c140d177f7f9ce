//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use mysite_core::{Permission, ProfileId, UserId, Username};

/// A site account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    /// May be empty.
    pub email: String,
    /// Inactive accounts cannot log in and hold no permissions.
    pub is_active: bool,
    /// Staff may export orders.
    pub is_staff: bool,
    /// Superusers implicitly hold every permission.
    pub is_superuser: bool,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Check a permission against the user's flags and explicit grants.
    #[must_use]
    pub fn has_permission(&self, granted: &BTreeSet<Permission>, permission: Permission) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_superuser || granted.contains(&permission)
    }
}

/// Fields for inserting a user.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a Username,
    /// Argon2 PHC string.
    pub password_hash: &'a str,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Per-user profile created at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub bio: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(is_active: bool, is_superuser: bool) -> User {
        User {
            id: UserId::new(1),
            username: Username::parse("alice").unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            is_active,
            is_staff: false,
            is_superuser,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_granted_permission() {
        let granted = BTreeSet::from([Permission::ViewOrder]);
        let alice = user(true, false);
        assert!(alice.has_permission(&granted, Permission::ViewOrder));
        assert!(!alice.has_permission(&granted, Permission::ViewProfile));
    }

    #[test]
    fn test_superuser_holds_everything() {
        let root = user(true, true);
        for perm in Permission::ALL {
            assert!(root.has_permission(&BTreeSet::new(), perm));
        }
    }

    #[test]
    fn test_inactive_user_holds_nothing() {
        let granted = BTreeSet::from([Permission::ViewOrder]);
        assert!(!user(false, true).has_permission(&granted, Permission::ViewOrder));
    }
}
