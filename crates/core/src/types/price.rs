//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("enter a number")]
    Invalid,
    /// The amount is below zero.
    #[error("ensure this value is greater than or equal to 0")]
    Negative,
    /// More digits than the column allows.
    #[error("ensure that there are no more than {max} digits in total")]
    TooManyDigits {
        /// Maximum number of digits.
        max: u32,
    },
    /// More fractional digits than the column allows.
    #[error("ensure that there are no more than {max} decimal places")]
    TooManyDecimalPlaces {
        /// Maximum number of decimal places.
        max: u32,
    },
    /// More digits before the decimal point than the column allows.
    #[error("ensure that there are no more than {max} digits before the decimal point")]
    TooManyWholeDigits {
        /// Maximum number of whole digits.
        max: u32,
    },
}

/// A product price.
///
/// Prices are stored with exactly two decimal places and at most eight digits
/// in total, so `19.9` is held (and displayed) as `19.90`.
///
/// Serializes as a decimal string (`"19.90"`) so no precision is lost in JSON.
///
/// ## Examples
///
/// ```
/// use mysite_core::Price;
///
/// assert_eq!(Price::parse("123.45").unwrap().to_string(), "123.45");
/// assert_eq!(Price::parse("7").unwrap().to_string(), "7.00");
/// assert!(Price::parse("1.999").is_err());
/// assert!(Price::parse("1234567.00").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Maximum number of digits in total.
    pub const MAX_DIGITS: u32 = 8;

    /// Number of decimal places kept.
    pub const DECIMAL_PLACES: u32 = 2;

    /// A zero price (`0.00`).
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, Self::DECIMAL_PLACES));

    /// Parse a `Price` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a number, is negative, or does
    /// not fit eight digits with two decimal places.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid)?;
        Self::from_decimal(amount)
    }

    /// Validate a decimal amount and normalise it to two decimal places.
    ///
    /// # Errors
    ///
    /// Same rules as [`Price::parse`].
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        let decimals = amount.scale();
        let mut digits = digit_count(amount.mantissa().unsigned_abs());
        if decimals > digits {
            digits = decimals;
        }
        let whole_digits = digits - decimals;

        if digits > Self::MAX_DIGITS {
            return Err(PriceError::TooManyDigits {
                max: Self::MAX_DIGITS,
            });
        }
        if decimals > Self::DECIMAL_PLACES {
            return Err(PriceError::TooManyDecimalPlaces {
                max: Self::DECIMAL_PLACES,
            });
        }
        if whole_digits > Self::MAX_DIGITS - Self::DECIMAL_PLACES {
            return Err(PriceError::TooManyWholeDigits {
                max: Self::MAX_DIGITS - Self::DECIMAL_PLACES,
            });
        }

        let mut normalised = amount.abs();
        normalised.rescale(Self::DECIMAL_PLACES);
        Ok(Self(normalised))
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

fn digit_count(mut n: u128) -> u32 {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::from_decimal(amount).map_err(serde::de::Error::custom)
    }
}
