//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input string is empty.
    #[error("username cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the allowed set.
    #[error("username may contain only letters, numbers, and @/./+/-/_ characters")]
    InvalidCharacter(char),
}

/// A login name.
///
/// ## Constraints
///
/// - Length: 1-150 characters
/// - Letters, digits and `@ . + - _` only
///
/// ## Examples
///
/// ```
/// use mysite_core::Username;
///
/// assert!(Username::parse("alice").is_ok());
/// assert!(Username::parse("bob.smith+shop@example").is_ok());
///
/// assert!(Username::parse("").is_err());
/// assert!(Username::parse("with space").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Maximum length of a username.
    pub const MAX_LENGTH: usize = 150;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 150 characters,
    /// or contains a character other than a letter, digit or `@.+-_`.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')))
        {
            return Err(UsernameError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(Username::parse("alice").is_ok());
        assert!(Username::parse("a").is_ok());
        assert!(Username::parse("user_01").is_ok());
        assert!(Username::parse("first.last+tag@host-name").is_ok());
    }

    #[test]
    fn test_empty_username() {
        assert_eq!(Username::parse(""), Err(UsernameError::Empty));
    }

    #[test]
    fn test_too_long_username() {
        let long = "a".repeat(151);
        assert_eq!(
            Username::parse(&long),
            Err(UsernameError::TooLong { max: 150 })
        );
        assert!(Username::parse(&"a".repeat(150)).is_ok());
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(
            Username::parse("bad name"),
            Err(UsernameError::InvalidCharacter(' '))
        );
        assert_eq!(
            Username::parse("semi;colon"),
            Err(UsernameError::InvalidCharacter(';'))
        );
    }

    #[test]
    fn test_serde_validates() {
        let name: Username = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(name.as_str(), "alice");
        assert!(serde_json::from_str::<Username>("\"no spaces\"").is_err());
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"alice\"");
    }
}
