//! HTML form parsing and validation.
//!
//! Each form keeps the raw submitted strings so an invalid submission can be
//! re-rendered as typed, plus a [`FormErrors`] map keyed by field name.

pub mod auth;
pub mod order;
pub mod product;

use std::collections::BTreeMap;

pub use auth::{LoginForm, RegisterForm};
pub use order::OrderForm;
pub use product::ProductForm;

/// Field key for errors that belong to the form as a whole.
pub const NON_FIELD: &str = "__all__";

/// Message for a missing mandatory field.
pub const REQUIRED: &str = "This field is required.";

/// Validation errors keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first error per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    /// The error for a field, or an empty string.
    #[must_use]
    pub fn field(&self, name: &str) -> &str {
        self.errors.get(name).map_or("", String::as_str)
    }

    /// Whether a field has an error.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.errors.contains_key(name)
    }

    /// The form-wide error, or an empty string.
    #[must_use]
    pub fn non_field(&self) -> &str {
        self.field(NON_FIELD)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Ok when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Max length message naming both limits.
pub(crate) fn too_long(max: usize, actual: usize) -> String {
    format!("Ensure this value has at most {max} characters (it has {actual}).")
}

/// Sentence-case an error message for display.
pub(crate) fn sentence(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        let mut out: String = first.to_uppercase().collect();
        out.push_str(chars.as_str());
        if !out.ends_with('.') {
            out.push('.');
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_error_per_field_wins() {
        let mut errors = FormErrors::new();
        errors.add("name", "first");
        errors.add("name", "second");
        assert_eq!(errors.field("name"), "first");
        assert_eq!(errors.field("price"), "");
        assert!(errors.has("name"));
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_into_result() {
        assert_eq!(FormErrors::new().into_result(5), Ok(5));

        let mut errors = FormErrors::new();
        errors.add(NON_FIELD, "nope");
        let err = errors.into_result(5).unwrap_err();
        assert_eq!(err.non_field(), "nope");
    }

    #[test]
    fn test_sentence() {
        assert_eq!(sentence("enter a number"), "Enter a number.");
        assert_eq!(sentence("Done."), "Done.");
        assert_eq!(sentence(""), "");
    }
}
