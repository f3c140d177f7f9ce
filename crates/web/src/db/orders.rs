//! Order repository for database operations.
//!
//! Orders are always read with their owner and products in a fixed number of
//! queries, independent of how many orders there are.

use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::SqlitePool;

use mysite_core::{OrderId, ProductId, UserId, Username};

use super::RepositoryError;
use super::products::ProductRepository;
use crate::models::{NewOrder, Order, OrderDetails, OrderProductLinks, Product};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    promocode: String,
    delivery_address: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            promocode: row.promocode,
            delivery_address: row.delivery_address,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderWithUserRow {
    #[sqlx(flatten)]
    order: OrderRow,
    username: String,
}

impl OrderWithUserRow {
    fn into_parts(self) -> Result<(Order, Username), RepositoryError> {
        let username = Username::parse(&self.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        Ok((self.order.into(), username))
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List every order in primary-key order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, promocode, delivery_address, created_at FROM orders ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// The whole `order_products` relation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_links(&self) -> Result<OrderProductLinks, RepositoryError> {
        let pairs = sqlx::query_as::<_, (OrderId, ProductId)>(
            "SELECT order_id, product_id FROM order_products",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(pairs.into_iter().collect())
    }

    /// Every order with its owner and products.
    ///
    /// Runs three queries: orders joined with users, the join table, and the
    /// referenced products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_details(&self) -> Result<Vec<OrderDetails>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderWithUserRow>(
            r"
            SELECT o.id, o.user_id, o.promocode, o.delivery_address, o.created_at, u.username
            FROM orders o
            JOIN users u ON u.id = o.user_id
            ORDER BY o.id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        self.attach_products(rows).await
    }

    /// One order with its owner and products.
    ///
    /// Only the order's own join rows and products are read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_details(&self, id: OrderId) -> Result<Option<OrderDetails>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderWithUserRow>(
            r"
            SELECT o.id, o.user_id, o.promocode, o.delivery_address, o.created_at, u.username
            FROM orders o
            JOIN users u ON u.id = o.user_id
            WHERE o.id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let (order, username) = row.into_parts()?;
        let products = ProductRepository::new(self.pool)
            .list_for_order(order.id)
            .await?;

        Ok(Some(OrderDetails {
            order,
            username,
            products,
        }))
    }

    /// Insert an order and its product links in one transaction.
    ///
    /// The caller is expected to have checked that the user and products
    /// exist; a dangling reference fails the foreign key and rolls back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, promocode, delivery_address, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, promocode, delivery_address, created_at
            ",
        )
        .bind(order.user_id)
        .bind(&order.promocode)
        .bind(&order.delivery_address)
        .bind(Utc::now().trunc_subsecs(6))
        .fetch_one(&mut *tx)
        .await?;

        for product_id in &order.products {
            sqlx::query("INSERT INTO order_products (order_id, product_id) VALUES (?, ?)")
                .bind(row.id)
                .bind(*product_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(row.into())
    }

    async fn attach_products(
        &self,
        rows: Vec<OrderWithUserRow>,
    ) -> Result<Vec<OrderDetails>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let links = self.product_links().await?;
        let products: BTreeMap<ProductId, Product> = ProductRepository::new(self.pool)
            .list_all()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        rows.into_iter()
            .map(|row| -> Result<OrderDetails, RepositoryError> {
                let (order, username) = row.into_parts()?;
                let products = links
                    .products_of(order.id)
                    .iter()
                    .filter_map(|id| products.get(id).cloned())
                    .collect();
                Ok(OrderDetails {
                    order,
                    username,
                    products,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use mysite_core::Price;

    use super::*;
    use crate::db::{UserRepository, test_support};
    use crate::models::{NewProduct, NewUser, User};

    async fn seed_user(pool: &SqlitePool, name: &str) -> User {
        let username = Username::parse(name).unwrap();
        UserRepository::new(pool)
            .create(&NewUser {
                username: &username,
                password_hash: "hash",
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap()
    }

    async fn seed_product(pool: &SqlitePool, name: &str) -> Product {
        ProductRepository::new(pool)
            .create(&NewProduct {
                name: name.to_owned(),
                description: String::new(),
                price: Price::parse("9.99").unwrap(),
                discount: 0,
                preview: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_with_products() {
        let pool = test_support::pool().await;
        let user = seed_user(&pool, "frank").await;
        let a = seed_product(&pool, "A").await;
        let b = seed_product(&pool, "B").await;

        let repo = OrderRepository::new(&pool);
        let order = repo
            .create(&NewOrder {
                user_id: user.id,
                promocode: "SALE10".to_owned(),
                delivery_address: "1 Main St".to_owned(),
                products: BTreeSet::from([b.id, a.id]),
            })
            .await
            .unwrap();

        let details = repo.get_details(order.id).await.unwrap().unwrap();
        assert_eq!(details.username.as_str(), "frank");
        assert_eq!(details.order.promocode, "SALE10");
        let names: Vec<&str> = details.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_order_without_products() {
        let pool = test_support::pool().await;
        let user = seed_user(&pool, "gina").await;

        let repo = OrderRepository::new(&pool);
        let order = repo
            .create(&NewOrder {
                user_id: user.id,
                promocode: String::new(),
                delivery_address: String::new(),
                products: BTreeSet::new(),
            })
            .await
            .unwrap();

        let details = repo.get_details(order.id).await.unwrap().unwrap();
        assert!(details.products.is_empty());
        assert!(repo.product_links().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dangling_product_rolls_back() {
        let pool = test_support::pool().await;
        let user = seed_user(&pool, "hank").await;

        let repo = OrderRepository::new(&pool);
        let result = repo
            .create(&NewOrder {
                user_id: user.id,
                promocode: String::new(),
                delivery_address: String::new(),
                products: BTreeSet::from([ProductId::new(404)]),
            })
            .await;

        assert!(result.is_err());
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_details_keeps_archived_products() {
        let pool = test_support::pool().await;
        let user = seed_user(&pool, "ivy").await;
        let a = seed_product(&pool, "A").await;
        ProductRepository::new(&pool).archive(a.id).await.unwrap();

        let repo = OrderRepository::new(&pool);
        repo.create(&NewOrder {
            user_id: user.id,
            promocode: String::new(),
            delivery_address: String::new(),
            products: BTreeSet::from([a.id]),
        })
        .await
        .unwrap();

        let details = repo.list_details().await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].products.len(), 1);
        assert!(details[0].products[0].is_archived());
    }

    #[tokio::test]
    async fn test_get_details_only_reads_its_own_products() {
        let pool = test_support::pool().await;
        let user = seed_user(&pool, "jack").await;
        let a = seed_product(&pool, "A").await;
        let b = seed_product(&pool, "B").await;
        let c = seed_product(&pool, "C").await;

        let repo = OrderRepository::new(&pool);
        let first = repo
            .create(&NewOrder {
                user_id: user.id,
                promocode: String::new(),
                delivery_address: String::new(),
                products: BTreeSet::from([a.id, c.id]),
            })
            .await
            .unwrap();
        repo.create(&NewOrder {
            user_id: user.id,
            promocode: String::new(),
            delivery_address: String::new(),
            products: BTreeSet::from([b.id]),
        })
        .await
        .unwrap();

        let details = repo.get_details(first.id).await.unwrap().unwrap();
        let names: Vec<&str> = details.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);

        let linked = ProductRepository::new(&pool)
            .list_for_order(first.id)
            .await
            .unwrap();
        assert_eq!(linked.len(), 2);
        assert!(
            ProductRepository::new(&pool)
                .list_for_order(OrderId::new(99))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_missing_order_is_none() {
        let pool = test_support::pool().await;
        let repo = OrderRepository::new(&pool);
        assert!(repo.get_details(OrderId::new(1)).await.unwrap().is_none());
    }
}
