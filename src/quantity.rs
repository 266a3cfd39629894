//! Quantities

use std::{fmt, num::NonZeroU32};

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use serde::{Deserialize, Serialize};

use crate::cart::CartError;

/// Number of units held by a cart line. Always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Quantity = Quantity(NonZeroU32::MIN);

    /// The largest quantity a line can hold.
    pub const MAX: Quantity = Quantity(NonZeroU32::MAX);

    /// Creates a quantity, returning `None` for zero.
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    /// Returns the number of units.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Converts a signed count, returning `None` when it is not in `1..=u32::MAX`.
    pub fn from_i64(value: i64) -> Option<Self> {
        u32::try_from(value).ok().and_then(Self::new)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = CartError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(CartError::InvalidQuantity(i64::from(value)))
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

/// 2^63, the first magnitude an `i64` cannot hold.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// How the cart treats quantities outside the valid range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityPolicy {
    /// Fail the call with an error and leave the cart untouched.
    #[default]
    Reject,

    /// Move the quantity to the nearest valid value and carry on.
    Clamp,
}

impl QuantityPolicy {
    /// Validates a quantity being added to a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for quantities below one under [`QuantityPolicy::Reject`].
    pub fn positive(self, requested: i64) -> Result<i64, CartError> {
        match self {
            _ if requested >= 1 => Ok(requested),
            QuantityPolicy::Reject => Err(CartError::InvalidQuantity(requested)),
            QuantityPolicy::Clamp => Ok(1),
        }
    }

    /// Validates the quantity a line is about to hold against the per-line limit.
    ///
    /// `requested` must already be positive.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityLimitExceeded`] when `requested` is above `limit` under
    /// [`QuantityPolicy::Reject`], or [`CartError::InvalidQuantity`] when it is below one.
    pub fn bounded(self, requested: i64, limit: Quantity) -> Result<Quantity, CartError> {
        if requested < 1 {
            return Err(CartError::InvalidQuantity(requested));
        }

        if requested <= i64::from(limit.get()) {
            return Quantity::from_i64(requested).ok_or(CartError::InvalidQuantity(requested));
        }

        match self {
            QuantityPolicy::Reject => Err(CartError::QuantityLimitExceeded { requested, limit }),
            QuantityPolicy::Clamp => Ok(limit),
        }
    }

    /// Converts an untyped numeric quantity (form input, scripts) into a whole count.
    ///
    /// Values beyond the `i64` range saturate by sign and are left to
    /// [`QuantityPolicy::positive`] and [`QuantityPolicy::bounded`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NonIntegerQuantity`] when the value is not finite, or when it has a
    /// fractional part under [`QuantityPolicy::Reject`].
    pub fn whole(self, value: f64) -> Result<i64, CartError> {
        if !value.is_finite() {
            return Err(CartError::NonIntegerQuantity(value));
        }

        if value.abs() >= I64_BOUND {
            return Ok(if value.is_sign_negative() { i64::MIN } else { i64::MAX });
        }

        let decimal = Decimal::from_f64(value).ok_or(CartError::NonIntegerQuantity(value))?;

        let whole = match self {
            _ if decimal.fract().is_zero() => decimal,
            QuantityPolicy::Reject => return Err(CartError::NonIntegerQuantity(value)),
            QuantityPolicy::Clamp => decimal.round(),
        };

        whole.to_i64().ok_or(CartError::NonIntegerQuantity(value))
    }

    /// Parses a textual quantity such as `"3"` or `"2.5"` into a whole count.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnparsableQuantity`] when the text is not a number, otherwise the
    /// errors of [`QuantityPolicy::whole`].
    pub fn parse(self, input: &str) -> Result<i64, CartError> {
        let trimmed = input.trim();

        if let Ok(value) = trimmed.parse::<i64>() {
            return Ok(value);
        }

        let value = trimmed
            .parse::<f64>()
            .map_err(|_err| CartError::UnparsableQuantity(input.to_string()))?;

        self.whole(value)
    }
}
