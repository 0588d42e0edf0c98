//! Money conversion between domain decimals and stored minor units.
//!
//! Prices and totals are `Decimal` in the domain and integer cents in the
//! store, so sums computed by SQLite stay exact.

use rust_decimal::Decimal;

use crate::errors::{AppError, AppResult};

/// Number of decimal places kept for money amounts.
pub const MONEY_SCALE: u32 = 2;

/// Convert stored cents into a decimal amount.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

/// Convert a decimal amount into cents, rounding half away from zero.
pub fn to_cents(amount: Decimal) -> AppResult<i64> {
    let mut rounded = amount.round_dp_with_strategy(
        MONEY_SCALE,
        rust_decimal::RoundingStrategy::MidpointAwayFromZero,
    );
    rounded.rescale(MONEY_SCALE);
    i64::try_from(rounded.mantissa())
        .map_err(|_| AppError::validation(format!("Amount {} is out of range", amount)))
}
