//! Exact monetary amount with two decimal places.
//!
//! CRITICAL: Never use floating-point for money.
//! This type wraps `rust_decimal::Decimal` and always carries scale 2, so an
//! amount round-trips through storage (as integer minor units) and through
//! serialization (as a string like `"12.50"`) without loss.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fractional digits every amount carries.
pub const AMOUNT_SCALE: u32 = 2;

/// Errors produced when constructing an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Input is not a decimal number.
    #[error("Not a valid number: '{0}'")]
    Invalid(String),

    /// Input has more than two significant fractional digits.
    #[error("Amount '{0}' has more than 2 decimal places")]
    TooPrecise(String),

    /// Input does not fit in 64-bit minor units.
    #[error("Amount '{0}' is out of range")]
    OutOfRange(String),
}

/// A monetary amount with exactly two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(Decimal);

impl Amount {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, AMOUNT_SCALE));

    /// Creates an amount from a decimal, rejecting extra precision.
    ///
    /// Trailing zeros are not precision: `12.500` is accepted as `12.50`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.normalize().scale() > AMOUNT_SCALE {
            return Err(AmountError::TooPrecise(value.to_string()));
        }

        let mut scaled = value;
        scaled.rescale(AMOUNT_SCALE);

        if i64::try_from(scaled.mantissa()).is_err() {
            return Err(AmountError::OutOfRange(value.to_string()));
        }

        Ok(Self(scaled))
    }

    /// Creates an amount from integer minor units (cents).
    #[must_use]
    pub fn from_minor_units(units: i64) -> Self {
        Self(Decimal::new(units, AMOUNT_SCALE))
    }

    /// Returns the amount in integer minor units (cents).
    #[must_use]
    pub fn minor_units(&self) -> i64 {
        // Construction guarantees scale 2 and an i64-sized mantissa.
        i64::try_from(self.0.mantissa()).unwrap_or_default()
    }

    /// Returns the underlying decimal value.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value =
            Decimal::from_str(trimmed).map_err(|_| AmountError::Invalid(trimmed.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
