//! Decimal helpers for monetary amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts that arrive as `f64` (legacy columns, imported sheets) are converted
//! exactly once at the boundary and never touched as floats again.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Number of decimal places for stored monetary values.
pub const MONEY_SCALE: u32 = 2;

/// Errors raised while bringing an amount into decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// NaN or infinity cannot be represented as money.
    #[error("Amount is not a finite number")]
    NotFinite,

    /// The value is outside the range a `Decimal` can hold.
    #[error("Amount {0} is out of range")]
    OutOfRange(String),
}

/// Converts a floating-point amount into a `Decimal`.
///
/// Uses the shortest representation that round-trips to the same `f64`, so
/// `0.1` becomes exactly `0.1` rather than its binary expansion.
///
/// # Errors
///
/// Returns an error for NaN, infinities, or magnitudes beyond `Decimal::MAX`.
pub fn from_f64(value: f64) -> Result<Decimal, MoneyError> {
    if !value.is_finite() {
        return Err(MoneyError::NotFinite);
    }
    let repr = value.to_string();
    Decimal::from_str(&repr)
        .or_else(|_| Decimal::from_scientific(&format!("{value:e}")))
        .map_err(|_| MoneyError::OutOfRange(repr))
}

/// Rounds an amount to two decimal places, midpoint away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
