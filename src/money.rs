//! Money amounts and percentage formatting.
//!
//! Amounts are held as [Decimal] so that sums are exact, and stored in the
//! database as integer cents.

use std::fmt::Display;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// Number of decimal places kept for money amounts.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// A non-negative amount of money with at most two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero dollars.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Create an amount.
    ///
    /// # Errors
    ///
    /// Returns an:
    /// - [Error::NegativeAmount] if `value` is less than zero,
    /// - [Error::TooManyDecimalPlaces] if `value` has fractional cents,
    /// - [Error::AmountOutOfRange] if `value` does not fit into 64-bit cents.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::NegativeAmount(value));
        }

        let value = value.normalize();

        if value.scale() > MONEY_DECIMAL_PLACES {
            return Err(Error::TooManyDecimalPlaces(value));
        }

        if to_cents(value).is_none() {
            return Err(Error::AmountOutOfRange(value));
        }

        Ok(Self(value))
    }

    /// Create an amount from a number of cents read from the database.
    ///
    /// Negative cents are clamped to zero, the table has a CHECK constraint so
    /// this only matters for hand-edited databases.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents.max(0), MONEY_DECIMAL_PLACES).normalize())
    }

    /// The amount in whole cents.
    pub fn cents(&self) -> i64 {
        // `new` guarantees the amount fits into i64 cents.
        to_cents(self.0).unwrap_or_default()
    }

    /// The amount as a decimal number.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = rust_decimal::serde::float::deserialize(deserializer)?;
        Amount::new(value).map_err(serde::de::Error::custom)
    }
}

/// Convert a decimal number of dollars into whole cents.
///
/// Fractional cents are rounded half away from zero. Returns `None` if the
/// result does not fit into an `i64`.
pub fn to_cents(value: Decimal) -> Option<i64> {
    let mut value = round_half_up(value, MONEY_DECIMAL_PLACES);
    value.rescale(MONEY_DECIMAL_PLACES);

    i64::try_from(value.mantissa()).ok()
}

/// Round `value` to `decimal_places`, rounding midpoints away from zero.
pub fn round_half_up(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Format `value` as a percentage string, e.g. "83.3%" or "40%".
///
/// The value is rounded to `precision` decimal places (midpoints away from
/// zero) and trailing zeros are dropped.
pub fn format_percentage(value: Decimal, precision: u32) -> String {
    format!("{}%", round_half_up(value, precision).normalize())
}
