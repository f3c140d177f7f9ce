//! Fine-grained permissions granted to users.

use serde::{Deserialize, Serialize};

/// Error returned when a permission codename is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown permission: {0}")]
pub struct PermissionError(pub String);

/// A permission codename of the form `app.action_model`.
///
/// Superusers implicitly hold every permission; regular users hold only the
/// ones granted to them.
///
/// ```
/// use mysite_core::Permission;
///
/// let perm: Permission = "shop.view_order".parse().unwrap();
/// assert_eq!(perm, Permission::ViewOrder);
/// assert_eq!(perm.to_string(), "shop.view_order");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Permission {
    AddProduct,
    ChangeProduct,
    DeleteProduct,
    ViewProduct,
    AddOrder,
    ChangeOrder,
    DeleteOrder,
    ViewOrder,
    ViewProfile,
    ChangeProfile,
}

impl Permission {
    /// Every known permission.
    pub const ALL: [Self; 10] = [
        Self::AddProduct,
        Self::ChangeProduct,
        Self::DeleteProduct,
        Self::ViewProduct,
        Self::AddOrder,
        Self::ChangeOrder,
        Self::DeleteOrder,
        Self::ViewOrder,
        Self::ViewProfile,
        Self::ChangeProfile,
    ];

    /// The stored codename, e.g. `shop.add_product`.
    #[must_use]
    pub const fn codename(self) -> &'static str {
        match self {
            Self::AddProduct => "shop.add_product",
            Self::ChangeProduct => "shop.change_product",
            Self::DeleteProduct => "shop.delete_product",
            Self::ViewProduct => "shop.view_product",
            Self::AddOrder => "shop.add_order",
            Self::ChangeOrder => "shop.change_order",
            Self::DeleteOrder => "shop.delete_order",
            Self::ViewOrder => "shop.view_order",
            Self::ViewProfile => "accounts.view_profile",
            Self::ChangeProfile => "accounts.change_profile",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.codename())
    }
}

impl std::str::FromStr for Permission {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|perm| perm.codename() == s)
            .ok_or_else(|| PermissionError(s.to_owned()))
    }
}

impl TryFrom<String> for Permission {
    type Error = PermissionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.codename().to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_codename_parses_back() {
        for perm in Permission::ALL {
            assert_eq!(perm.codename().parse::<Permission>().unwrap(), perm);
        }
    }

    #[test]
    fn test_unknown_codename() {
        let err = "shop.fly_product".parse::<Permission>().unwrap_err();
        assert_eq!(err.to_string(), "unknown permission: shop.fly_product");
    }

    #[test]
    fn test_serde_uses_codename() {
        let json = serde_json::to_string(&Permission::ViewProfile).unwrap();
        assert_eq!(json, "\"accounts.view_profile\"");
        let back: Permission = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Permission::ViewProfile);
    }
}
