//! Load users, products and orders from a JSON fixture document.
//!
//! ## Format
//!
//! ```json
//! {
//!   "users": [
//!     {"username": "admin", "password": "...", "is_staff": true,
//!      "permissions": ["shop.view_order"], "bio": "Runs the shop"}
//!   ],
//!   "products": [
//!     {"name": "Laptop", "price": "1999.00", "discount": 5, "archived": false}
//!   ],
//!   "orders": [
//!     {"user": "admin", "promocode": "SALE", "delivery_address": "1 Main St",
//!      "products": ["Laptop"]}
//!   ]
//! }
//! ```
//!
//! Orders reference users by username and products by name. Every section is
//! optional.

use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, instrument};

use mysite_core::{Permission, Price, ProductId, UserId, Username};

use super::auth::{AuthError, hash_password};
use crate::db::{OrderRepository, ProductRepository, ProfileRepository, RepositoryError, UserRepository};
use crate::models::{NewOrder, NewProduct, NewUser};

/// Errors raised while loading fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("invalid fixture document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("order references unknown user '{0}'")]
    UnknownUser(String),

    #[error("order references unknown product '{0}'")]
    UnknownProduct(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A whole fixture document.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub users: Vec<FixtureUser>,
    pub products: Vec<FixtureProduct>,
    pub orders: Vec<FixtureOrder>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureUser {
    pub username: Username,
    pub password: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Deserialize)]
pub struct FixtureProduct {
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount: u16,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub preview: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureOrder {
    pub user: String,
    #[serde(default)]
    pub promocode: String,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub products: Vec<String>,
}

/// Counts of rows created by [`load`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub users: usize,
    pub products: usize,
    pub orders: usize,
}

impl Fixtures {
    /// Parse a JSON fixture document.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Parse` if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Insert every fixture row, in document order.
///
/// Rows are inserted one statement at a time; a failure part-way leaves the
/// rows before it in place.
///
/// # Errors
///
/// Returns `FixtureError` if a row conflicts with existing data or an order
/// references a user or product not in the document.
#[instrument(skip_all, fields(
    users = fixtures.users.len(),
    products = fixtures.products.len(),
    orders = fixtures.orders.len(),
))]
pub async fn load(pool: &SqlitePool, fixtures: &Fixtures) -> Result<LoadSummary, FixtureError> {
    let users = UserRepository::new(pool);
    let profiles = ProfileRepository::new(pool);
    let products = ProductRepository::new(pool);
    let orders = OrderRepository::new(pool);

    let mut user_ids: HashMap<&str, UserId> = HashMap::new();
    for fixture in &fixtures.users {
        let password_hash = hash_password(&fixture.password)?;
        let user = users
            .create(&NewUser {
                username: &fixture.username,
                password_hash: &password_hash,
                is_staff: fixture.is_staff,
                is_superuser: fixture.is_superuser,
            })
            .await?;
        profiles.create(user.id, &fixture.bio).await?;
        for permission in &fixture.permissions {
            users.grant(user.id, *permission).await?;
        }
        user_ids.insert(fixture.username.as_str(), user.id);
    }

    let mut product_ids: HashMap<&str, ProductId> = HashMap::new();
    for fixture in &fixtures.products {
        let product = products
            .create(&NewProduct {
                name: fixture.name.clone(),
                description: fixture.description.clone(),
                price: fixture.price,
                discount: fixture.discount,
                preview: fixture.preview.clone(),
            })
            .await?;
        if fixture.archived {
            products.archive(product.id).await?;
        }
        product_ids.insert(fixture.name.as_str(), product.id);
    }

    for fixture in &fixtures.orders {
        let user_id = *user_ids
            .get(fixture.user.as_str())
            .ok_or_else(|| FixtureError::UnknownUser(fixture.user.clone()))?;
        let linked = fixture
            .products
            .iter()
            .map(|name| {
                product_ids
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| FixtureError::UnknownProduct(name.clone()))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        orders
            .create(&NewOrder {
                user_id,
                promocode: fixture.promocode.clone(),
                delivery_address: fixture.delivery_address.clone(),
                products: linked,
            })
            .await?;
    }

    let summary = LoadSummary {
        users: fixtures.users.len(),
        products: fixtures.products.len(),
        orders: fixtures.orders.len(),
    };
    info!(?summary, "fixtures loaded");
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support;

    const DOCUMENT: &str = r#"{
        "users": [
            {"username": "manager", "password": "m4nager-pass", "is_staff": true,
             "permissions": ["shop.view_order"], "bio": "Runs the shop"}
        ],
        "products": [
            {"name": "Laptop", "price": "1999.00"},
            {"name": "Fax", "price": "15.50", "archived": true}
        ],
        "orders": [
            {"user": "manager", "promocode": "SALE", "delivery_address": "1 Main St",
             "products": ["Fax", "Laptop"]}
        ]
    }"#;

    #[tokio::test]
    async fn test_load_document() {
        let pool = test_support::pool().await;
        let fixtures = Fixtures::from_json(DOCUMENT).unwrap();

        let summary = load(&pool, &fixtures).await.unwrap();
        assert_eq!(
            summary,
            LoadSummary {
                users: 1,
                products: 2,
                orders: 1
            }
        );

        let manager = UserRepository::new(&pool)
            .get_by_username(&Username::parse("manager").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(manager.is_staff);
        let perms = UserRepository::new(&pool).permissions(manager.id).await.unwrap();
        assert!(perms.contains(&Permission::ViewOrder));

        let profile = ProfileRepository::new(&pool)
            .get_by_user(manager.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.bio, "Runs the shop");

        let active = ProductRepository::new(&pool).list_active().await.unwrap();
        assert_eq!(active.len(), 1);

        let details = OrderRepository::new(&pool).list_details().await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].products.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_order_product() {
        let pool = test_support::pool().await;
        let fixtures = Fixtures::from_json(
            r#"{"users": [{"username": "u", "password": "long-enough"}],
                "orders": [{"user": "u", "products": ["Nope"]}]}"#,
        )
        .unwrap();

        let err = load(&pool, &fixtures).await.unwrap_err();
        assert!(matches!(err, FixtureError::UnknownProduct(ref name) if name == "Nope"));
    }

    #[test]
    fn test_rejects_bad_price() {
        let err = Fixtures::from_json(r#"{"products": [{"name": "X", "price": "1.234"}]}"#)
            .unwrap_err();
        assert!(matches!(err, FixtureError::Parse(_)));
    }
}
