//! Product create/update form.

use serde::Deserialize;

use mysite_core::Price;

use super::{FormErrors, REQUIRED, sentence, too_long};
use crate::models::{NewProduct, Product};

/// Maximum product name length.
pub const NAME_MAX_LENGTH: usize = 100;

/// Largest accepted discount (`SMALLINT` range).
pub const MAX_DISCOUNT: u16 = 32767;

/// Raw product form fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub description: String,
    pub discount: String,
    pub preview: String,
}

impl ProductForm {
    /// Blank form with the model defaults filled in.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            price: Price::ZERO.to_string(),
            discount: "0".to_owned(),
            ..Self::default()
        }
    }

    /// Pre-filled form for editing an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.to_string(),
            description: product.description.clone(),
            discount: product.discount.to_string(),
            preview: product.preview.clone().unwrap_or_default(),
        }
    }

    /// Validate every field, collecting all errors.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors if any field is invalid.
    pub fn validate(&self) -> Result<NewProduct, FormErrors> {
        let mut errors = FormErrors::new();

        let name = self.name.trim();
        let name_len = name.chars().count();
        if name.is_empty() {
            errors.add("name", REQUIRED);
        } else if name_len > NAME_MAX_LENGTH {
            errors.add("name", too_long(NAME_MAX_LENGTH, name_len));
        }

        let price = if self.price.trim().is_empty() {
            errors.add("price", REQUIRED);
            None
        } else {
            Price::parse(&self.price)
                .map_err(|e| errors.add("price", sentence(&e.to_string())))
                .ok()
        };

        let discount = self.parse_discount(&mut errors);

        let preview = self.preview.trim();
        let preview = (!preview.is_empty()).then(|| preview.to_owned());

        match (price, discount) {
            (Some(price), Some(discount)) => errors.into_result(NewProduct {
                name: name.to_owned(),
                description: self.description.clone(),
                price,
                discount,
                preview,
            }),
            _ => Err(errors),
        }
    }

    fn parse_discount(&self, errors: &mut FormErrors) -> Option<u16> {
        let raw = self.discount.trim();
        if raw.is_empty() {
            errors.add("discount", REQUIRED);
            return None;
        }

        let Ok(value) = raw.parse::<i64>() else {
            errors.add("discount", "Enter a whole number.");
            return None;
        };

        if value < 0 {
            errors.add(
                "discount",
                "Ensure this value is greater than or equal to 0.",
            );
            return None;
        }

        match u16::try_from(value) {
            Ok(v) if v <= MAX_DISCOUNT => Some(v),
            _ => {
                errors.add(
                    "discount",
                    format!("Ensure this value is less than or equal to {MAX_DISCOUNT}."),
                );
                None
            }
        }
    }
}
