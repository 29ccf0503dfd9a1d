//! Fixed-point currency amounts.
//!
//! Amounts are `rust_decimal::Decimal` values held at exactly two decimal
//! places, matching the `NUMERIC(12,2)` columns they are stored in. Floating
//! point never touches a monetary value.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of decimal places every [`Money`] value carries.
pub const MONEY_SCALE: u32 = 2;

/// Errors that can occur when constructing a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// The amount has fractions of a cent.
    #[error("amount must have at most {MONEY_SCALE} decimal places")]
    TooPrecise,
    /// The amount does not fit the storage column.
    #[error("amount must be at most {max}")]
    TooLarge {
        /// Largest storable amount.
        max: Decimal,
    },
    /// A strictly positive amount was required.
    #[error("amount must be greater than zero")]
    NotPositive,
}

/// A non-negative currency amount with cent precision.
///
/// Serializes as a decimal string (`"45.00"`); deserializes from either a
/// string or a JSON number and validates on the way in.
///
/// ```
/// use rust_decimal::Decimal;
/// use wayfarer_core::Money;
///
/// let amount = Money::try_from(Decimal::new(9000, 2)).unwrap();
/// assert_eq!(amount.to_string(), "90.00");
/// assert!(Money::try_from(Decimal::new(1005, 3)).is_err()); // 1.005
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount a `NUMERIC(12,2)` column holds.
    #[must_use]
    pub fn max_value() -> Decimal {
        Decimal::new(999_999_999_999, MONEY_SCALE)
    }

    /// Build an amount from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] or [`MoneyError::TooLarge`].
    pub fn from_cents(cents: i64) -> Result<Self, MoneyError> {
        Self::try_from(Decimal::new(cents, MONEY_SCALE))
    }

    /// Validate that the amount is strictly positive (expense amounts).
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::NotPositive`] for zero.
    pub fn require_positive(self) -> Result<Self, MoneyError> {
        if self.0.is_zero() {
            return Err(MoneyError::NotPositive);
        }
        Ok(self)
    }

    /// The amount as a decimal, always at two decimal places.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(MoneyError::Negative);
        }

        let normalized = value.normalize();
        if normalized.scale() > MONEY_SCALE {
            return Err(MoneyError::TooPrecise);
        }

        let max = Self::max_value();
        if normalized > max {
            return Err(MoneyError::TooLarge { max });
        }

        let mut amount = normalized;
        amount.rescale(MONEY_SCALE);
        Ok(Self(amount))
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rescales_to_cents() {
        let whole = Money::try_from(Decimal::from(12)).unwrap();
        assert_eq!(whole.amount().scale(), 2);
        assert_eq!(whole.to_string(), "12.00");

        let trailing = Money::try_from(Decimal::new(12_500, 3)).unwrap(); // 12.500
        assert_eq!(trailing.to_string(), "12.50");
    }

    #[test]
    fn test_rejects_invalid_amounts() {
        assert_eq!(
            Money::try_from(Decimal::new(-1, 2)),
            Err(MoneyError::Negative)
        );
        assert_eq!(
            Money::try_from(Decimal::new(1001, 3)),
            Err(MoneyError::TooPrecise)
        );
        assert!(matches!(
            Money::try_from(Decimal::new(1_000_000_000_000, 2)),
            Err(MoneyError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_require_positive() {
        assert_eq!(Money::ZERO.require_positive(), Err(MoneyError::NotPositive));
        assert!(Money::from_cents(1).unwrap().require_positive().is_ok());
    }

    #[test]
    fn test_json_accepts_string_and_number() {
        let from_str: Money = serde_json::from_str("\"90.00\"").unwrap();
        let from_num: Money = serde_json::from_str("90").unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(serde_json::to_string(&from_num).unwrap(), "\"90.00\"");
        assert!(serde_json::from_str::<Money>("\"-3\"").is_err());
    }
}
