//! Price type backed by decimal arithmetic.
//!
//! Prices are currency-agnostic decimal amounts in the currency's standard
//! unit (e.g. dollars, not cents). Conversion to integer minor units happens
//! only at payment time via [`Price::minor_units`].

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing or converting a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is not a decimal number.
    #[error("price is not a valid decimal number")]
    Invalid,
    /// The amount is zero or negative.
    #[error("price must be greater than zero")]
    NotPositive,
    /// The amount does not fit in integer minor units.
    #[error("price is out of range for minor-unit conversion")]
    OutOfRange,
}

/// A positive decimal price.
///
/// Positivity is enforced at construction, so a `Price` read back from
/// storage or arriving through an API boundary is always safe to convert
/// to minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a `Price` from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` if the amount is zero or negative.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        Ok(Self(amount))
    }

    /// Parse a `Price` from a decimal string such as `"9.99"`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Invalid` if the string is not a decimal number,
    /// or `PriceError::NotPositive` if the amount is zero or negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount: Decimal = s.trim().parse().map_err(|_| PriceError::Invalid)?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Convert to integer minor units (e.g. cents for USD).
    ///
    /// Rounds to the nearest minor unit, half away from zero.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::OutOfRange` if the result does not fit in `i64`.
    pub fn minor_units(&self) -> Result<i64, PriceError> {
        let cents = self
            .0
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(PriceError::OutOfRange)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        cents.to_i64().ok_or(PriceError::OutOfRange)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
