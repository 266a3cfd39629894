//! Pricing
//!
//! Cart totals are always derived from the lines; nothing here caches a result.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use thiserror::Error;

use crate::lines::CartLine;

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// The sum of line totals does not fit in minor units.
    #[error("cart total overflowed the representable range")]
    Overflow,
}

/// Sum of quantities across all lines.
pub fn total_items(lines: &[CartLine<'_>]) -> u64 {
    lines
        .iter()
        .map(|line| u64::from(line.quantity().get()))
        .sum()
}

/// Sum of quantity multiplied by unit price across all lines.
///
/// An empty slice totals zero in `currency`.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if any line total, or their sum, overflows.
pub fn total_price<'a>(
    lines: &[CartLine<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    let minor_units = lines.iter().try_fold(0_i64, |acc, line| {
        line.total_minor_units()
            .and_then(|total| acc.checked_add(total))
            .ok_or(TotalPriceError::Overflow)
    })?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Looks up a supported ISO currency by its alphabetic code.
pub fn currency_from_code(code: &str) -> Option<&'static Currency> {
    match code.trim() {
        "GBP" => Some(GBP),
        "USD" => Some(USD),
        "EUR" => Some(EUR),
        _ => None,
    }
}

/// Converts a decimal amount such as `"2.99"` into minor units.
pub fn parse_minor_units(amount: &str) -> Option<i64> {
    amount
        .trim()
        .parse::<Decimal>()
        .ok()?
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
}
