//! Product repository for database operations.

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::SqlitePool;

use mysite_core::{OrderId, Price, ProductId, ProductStatus};

use super::RepositoryError;
use crate::models::{NewProduct, Product};

/// Column list shared by every product query.
const PRODUCT_COLUMNS: &str =
    "id, name, description, price, discount, created_at, archived, preview";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: String,
    discount: i64,
    created_at: DateTime<Utc>,
    archived: bool,
    preview: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::parse(&row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;
        let discount = u16::try_from(row.discount).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "invalid discount in database: {}",
                row.discount
            ))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price,
            discount,
            created_at: row.created_at,
            status: ProductStatus::from_archived(row.archived),
            preview: row.preview,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List products that are not archived, in primary-key order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE archived = FALSE ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// List every product, archived included, in primary-key order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by primary key, archived or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Products linked to one order, in primary-key order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_order(&self, order: OrderId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE id IN (SELECT product_id FROM order_products WHERE order_id = ?) \
             ORDER BY id"
        ))
        .bind(order)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Which of the given IDs exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn existing_ids(
        &self,
        ids: impl IntoIterator<Item = ProductId>,
    ) -> Result<Vec<ProductId>, RepositoryError> {
        let ids: Vec<ProductId> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT id FROM products WHERE id IN ({placeholders}) ORDER BY id");
        let mut query = sqlx::query_scalar::<_, ProductId>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        Ok(query.fetch_all(self.pool).await?)
    }

    /// Insert a new, active product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products (name, description, price, discount, created_at, archived, preview)
            VALUES (?, ?, ?, ?, ?, FALSE, ?)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.to_string())
        .bind(i64::from(product.discount))
        .bind(Utc::now().trunc_subsecs(6))
        .bind(product.preview.as_deref())
        .fetch_one(self.pool)
        .await?;

        Product::try_from(row)
    }

    /// Overwrite the editable fields of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products
            SET name = ?, description = ?, price = ?, discount = ?, preview = ?
            WHERE id = ?
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.to_string())
        .bind(i64::from(product.discount))
        .bind(product.preview.as_deref())
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Product::try_from(row)
    }

    /// Soft-delete a product. The row and its order links are kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn archive(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE products SET archived = TRUE WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
