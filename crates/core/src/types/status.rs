//! Status enums for catalog entities.

use serde::{Deserialize, Serialize};

/// Whether a product is listed in the catalog.
///
/// Stored as the `archived` boolean column. Archiving is a soft delete: the
/// product row and its order links stay in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Visible in the product list.
    #[default]
    Active,
    /// Hidden from the product list but still reachable by primary key.
    Archived,
}

impl ProductStatus {
    /// Build the status from the stored `archived` flag.
    #[must_use]
    pub const fn from_archived(archived: bool) -> Self {
        if archived {
            Self::Archived
        } else {
            Self::Active
        }
    }

    /// Returns the value of the stored `archived` flag.
    #[must_use]
    pub const fn is_archived(self) -> bool {
        matches!(self, Self::Archived)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Archived => write!(f, "archived"),
        }
    }
}
