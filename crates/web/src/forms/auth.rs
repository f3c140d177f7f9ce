//! Login and registration forms.

use serde::Deserialize;

use super::{FormErrors, NON_FIELD, REQUIRED, sentence};
use crate::services::auth::AuthError;

/// Login form data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Where to go after logging in.
    pub next: String,
}

impl LoginForm {
    /// Check that both fields were filled in.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors for empty fields.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.username.is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_result(())
    }
}

/// Registration form data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

impl RegisterForm {
    /// Check that every field was filled in.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors for empty fields.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.username.is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        }
        errors.into_result(())
    }
}

/// Attach a registration failure to the field it concerns.
///
/// Returns `None` for failures that are not the user's fault.
#[must_use]
pub fn registration_errors(err: &AuthError) -> Option<FormErrors> {
    let mut errors = FormErrors::new();
    match err {
        AuthError::InvalidUsername(e) => errors.add("username", sentence(&e.to_string())),
        AuthError::UserAlreadyExists => {
            errors.add("username", "A user with that username already exists.");
        }
        AuthError::PasswordMismatch => {
            errors.add("password2", "The two password fields didn\u{2019}t match.");
        }
        AuthError::WeakPassword(msg) => errors.add("password2", msg.clone()),
        AuthError::InvalidCredentials => errors.add(NON_FIELD, sentence(&err.to_string())),
        AuthError::Repository(_) | AuthError::PasswordHash => return None,
    }
    Some(errors)
}

/// The login page error for bad credentials.
#[must_use]
pub fn login_failed() -> FormErrors {
    let mut errors = FormErrors::new();
    errors.add(
        NON_FIELD,
        "Please enter a correct username and password. Note that both fields may be case-sensitive.",
    );
    errors
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("password"));
    }

    #[test]
    fn test_register_requires_all_fields() {
        let form = RegisterForm {
            username: "alice".to_owned(),
            ..RegisterForm::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(!errors.has("username"));
        assert!(errors.has("password1"));
        assert!(errors.has("password2"));
    }

    #[test]
    fn test_registration_errors_map_to_fields() {
        let errors = registration_errors(&AuthError::UserAlreadyExists).unwrap();
        assert!(errors.has("username"));

        let errors = registration_errors(&AuthError::PasswordMismatch).unwrap();
        assert!(errors.has("password2"));

        assert!(registration_errors(&AuthError::PasswordHash).is_none());
    }
}
