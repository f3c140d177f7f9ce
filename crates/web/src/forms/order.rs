//! Order creation form.
//!
//! `products` is a multi-select, so the body is decoded pair by pair instead
//! of through `serde`.

use std::collections::BTreeSet;

use sqlx::SqlitePool;

use mysite_core::{ProductId, UserId};

use super::{FormErrors, REQUIRED, too_long};
use crate::db::{ProductRepository, RepositoryError, UserRepository};
use crate::models::NewOrder;

/// Maximum promocode length.
pub const PROMOCODE_MAX_LENGTH: usize = 20;

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Raw order form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub user: String,
    pub promocode: String,
    pub delivery_address: String,
    pub products: Vec<String>,
}

impl OrderForm {
    /// Decode an `application/x-www-form-urlencoded` body.
    ///
    /// Unknown keys are ignored; repeated `products` keys accumulate.
    #[must_use]
    pub fn from_urlencoded(body: &[u8]) -> Self {
        let mut form = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "user" => form.user = value.into_owned(),
                "promocode" => form.promocode = value.into_owned(),
                "delivery_address" => form.delivery_address = value.into_owned(),
                "products" => form.products.push(value.into_owned()),
                _ => {}
            }
        }
        form
    }

    /// Whether a product ID was among the submitted choices.
    #[must_use]
    pub fn has_product(&self, id: &str) -> bool {
        self.products.iter().any(|p| p == id)
    }

    /// Check field formats without touching the database.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors if any field is malformed.
    pub fn validate(&self) -> Result<NewOrder, FormErrors> {
        let mut errors = FormErrors::new();

        let user_id = if self.user.trim().is_empty() {
            errors.add("user", REQUIRED);
            None
        } else {
            self.user
                .parse::<UserId>()
                .map_err(|_| errors.add("user", INVALID_CHOICE))
                .ok()
        };

        let promocode_len = self.promocode.chars().count();
        if promocode_len > PROMOCODE_MAX_LENGTH {
            errors.add("promocode", too_long(PROMOCODE_MAX_LENGTH, promocode_len));
        }

        let mut products = BTreeSet::new();
        for raw in &self.products {
            match raw.parse::<ProductId>() {
                Ok(id) => {
                    products.insert(id);
                }
                Err(_) => {
                    errors.add(
                        "products",
                        format!("\u{201c}{raw}\u{201d} is not a valid value."),
                    );
                }
            }
        }

        match user_id {
            Some(user_id) => errors.into_result(NewOrder {
                user_id,
                promocode: self.promocode.clone(),
                delivery_address: self.delivery_address.clone(),
                products,
            }),
            None => Err(errors),
        }
    }
}

/// Check that the order's user and products exist.
///
/// Returns the errors found; an empty map means the order can be saved.
///
/// # Errors
///
/// Returns `RepositoryError` if a lookup fails.
pub async fn check_references(
    pool: &SqlitePool,
    order: &NewOrder,
) -> Result<FormErrors, RepositoryError> {
    let mut errors = FormErrors::new();

    if UserRepository::new(pool)
        .get_by_id(order.user_id)
        .await?
        .is_none()
    {
        errors.add("user", INVALID_CHOICE);
    }

    let found: BTreeSet<ProductId> = ProductRepository::new(pool)
        .existing_ids(order.products.iter().copied())
        .await?
        .into_iter()
        .collect();
    if let Some(missing) = order.products.difference(&found).next() {
        errors.add(
            "products",
            format!("Select a valid choice. {missing} is not one of the available choices."),
        );
    }

    Ok(errors)
}
