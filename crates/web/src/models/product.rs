//! Product domain types.

use chrono::{DateTime, Utc};

use mysite_core::{Price, ProductId, ProductStatus};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Primary key.
    pub id: ProductId,
    /// Display name (1-100 characters).
    pub name: String,
    /// Free-form description, may be empty.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Discount percentage.
    pub discount: u16,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// Listed or archived.
    pub status: ProductStatus,
    /// Optional preview image reference.
    pub preview: Option<String>,
}

impl Product {
    /// Whether the product has been soft-deleted.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.status.is_archived()
    }
}

/// Validated fields for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub discount: u16,
    pub preview: Option<String>,
}
