//! Cart lines

use rusty_money::{Money, iso::Currency};

use crate::{items::Item, pricing::TotalPriceError, quantity::Quantity};

/// One aggregated cart entry: a distinct item and how many units of it are held.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine<'a> {
    item: Item<'a>,
    quantity: Quantity,
}

impl<'a> CartLine<'a> {
    /// Creates a new line.
    pub fn new(item: Item<'a>, quantity: Quantity) -> Self {
        Self { item, quantity }
    }

    /// Returns the item held by this line
    pub fn item(&self) -> &Item<'a> {
        &self.item
    }

    /// Returns the number of units held
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub(crate) fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
    }

    /// Unit price multiplied by quantity, in minor units. `None` on overflow.
    pub fn total_minor_units(&self) -> Option<i64> {
        self.item
            .price()
            .to_minor_units()
            .checked_mul(i64::from(self.quantity.get()))
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`TotalPriceError::Overflow`] if the line total does not fit in minor units.
    pub fn total(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        let minor_units = self.total_minor_units().ok_or(TotalPriceError::Overflow)?;

        Ok(Money::from_minor(minor_units, self.item.price().currency()))
    }
}
