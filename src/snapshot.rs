//! Cart snapshots

use std::rc::Rc;

use rusty_money::{Money, iso::Currency};

use crate::{
    lines::CartLine,
    pricing::{self, TotalPriceError},
};

/// Immutable view of a cart at one point in time.
///
/// Snapshots share their lines with the cart until the cart next changes, so
/// cloning one is cheap and holding one never observes later mutations.
#[derive(Clone, Debug, PartialEq)]
pub struct CartSnapshot<'a> {
    lines: Rc<Vec<CartLine<'a>>>,
    currency: &'static Currency,
}

impl<'a> CartSnapshot<'a> {
    pub(crate) fn new(lines: Rc<Vec<CartLine<'a>>>, currency: &'static Currency) -> Self {
        Self { lines, currency }
    }

    /// Lines in the order their items were first added.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Returns the line for `item_id`, if present.
    pub fn line(&self, item_id: &str) -> Option<&CartLine<'a>> {
        self.lines
            .iter()
            .find(|line| line.item().id().as_str() == item_id)
    }

    /// Iterate over the lines.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.iter()
    }

    /// Sum of quantities across all lines.
    pub fn total_items(&self) -> u64 {
        pricing::total_items(&self.lines)
    }

    /// Sum of quantity multiplied by unit price across all lines.
    ///
    /// # Errors
    ///
    /// Returns [`TotalPriceError::Overflow`] if the total does not fit in minor units.
    pub fn total_price(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        pricing::total_price(&self.lines, self.currency)
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart held no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
