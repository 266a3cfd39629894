//! Cart
//!
//! The cart is an owned value created by the application root and handed to
//! whatever needs it. It is single-threaded: every mutation runs to completion
//! and then notifies subscribers synchronously with the new snapshot.

use std::{fmt, rc::Rc};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::CartConfig,
    items::{Item, ItemId},
    lines::CartLine,
    observers::{CartObserver, SubscriptionKey},
    pricing::{self, TotalPriceError},
    quantity::Quantity,
    snapshot::CartSnapshot,
};

/// Errors raised by cart operations. A failed call leaves the cart unchanged.
#[derive(Debug, Error)]
pub enum CartError {
    /// A quantity below one was supplied where a positive count is required.
    #[error("quantity must be a positive whole number, got {0}")]
    InvalidQuantity(i64),

    /// A quantity with a fractional part, or a non-finite one.
    #[error("quantity must be a whole number, got {0}")]
    NonIntegerQuantity(f64),

    /// Quantity text that is not a number.
    #[error("quantity is not a number: {0:?}")]
    UnparsableQuantity(String),

    /// A line would hold more than the configured limit.
    #[error("quantity {requested} exceeds the per-line limit of {limit}")]
    QuantityLimitExceeded {
        /// Quantity the line would have held
        requested: i64,
        /// Configured per-line limit
        limit: Quantity,
    },

    /// No line exists for the item.
    #[error("no cart line for item {0}")]
    LineNotFound(ItemId),

    /// The item is priced in a different currency to the cart.
    #[error("item {item} has currency {item_currency}, but cart has currency {cart_currency}")]
    CurrencyMismatch {
        /// Offending item
        item: ItemId,
        /// Currency of the item price
        item_currency: &'static str,
        /// Currency of the cart
        cart_currency: &'static str,
    },

    /// The item has a negative unit price.
    #[error("item {0} has a negative price")]
    NegativePrice(ItemId),
}

/// Cart
pub struct Cart<'a> {
    lines: Rc<Vec<CartLine<'a>>>,
    positions: FxHashMap<ItemId, usize>,
    config: CartConfig,
    subscribers: SlotMap<SubscriptionKey, Box<dyn CartObserver<'a> + 'a>>,
}

impl<'a> Cart<'a> {
    /// Create a new, empty cart.
    pub fn new(config: CartConfig) -> Self {
        Self {
            lines: Rc::default(),
            positions: FxHashMap::default(),
            config,
            subscribers: SlotMap::with_key(),
        }
    }

    /// Add `quantity` units of `item`.
    ///
    /// Creates a line on the first add of an item id and increments it on later
    /// adds; the line keeps the item data it was created with.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is below one and the policy rejects.
    /// - [`CartError::QuantityLimitExceeded`]: the line would exceed the per-line limit and the policy rejects.
    /// - [`CartError::CurrencyMismatch`]: the item is priced in another currency.
    /// - [`CartError::NegativePrice`]: the item has a negative price.
    pub fn add_item(&mut self, item: Item<'a>, quantity: i64) -> Result<CartSnapshot<'a>, CartError> {
        self.check_item(&item).inspect_err(log_rejection)?;

        let policy = self.config.quantity_policy();
        let requested = policy.positive(quantity).inspect_err(log_rejection)?;

        let item_id = item.id().clone();
        let position = self.positions.get(&item_id).copied();
        let current = position
            .and_then(|index| self.lines.get(index))
            .map_or(0, |line| i64::from(line.quantity().get()));

        let quantity = policy
            .bounded(
                current.saturating_add(requested),
                self.config.max_line_quantity(),
            )
            .inspect_err(log_rejection)?;

        if let Some(index) = position {
            if i64::from(quantity.get()) == current {
                return Ok(self.snapshot());
            }

            if let Some(line) = Rc::make_mut(&mut self.lines).get_mut(index) {
                line.set_quantity(quantity);
            }
        } else {
            self.positions.insert(item_id.clone(), self.lines.len());
            Rc::make_mut(&mut self.lines).push(CartLine::new(item, quantity));
        }

        debug!(item_id = %item_id, quantity = quantity.get(), "added item to cart");

        Ok(self.publish())
    }

    /// Add a single unit of `item`.
    ///
    /// # Errors
    ///
    /// See [`Cart::add_item`].
    pub fn add_one(&mut self, item: Item<'a>) -> Result<CartSnapshot<'a>, CartError> {
        self.add_item(item, 1)
    }

    /// Remove the line for `item_id`. Removing an absent item does nothing.
    pub fn remove_item(&mut self, item_id: &str) -> CartSnapshot<'a> {
        let Some(index) = self.positions.remove(item_id) else {
            debug!(item_id, "item not in cart, nothing to remove");
            return self.snapshot();
        };

        let lines = Rc::make_mut(&mut self.lines);

        if index < lines.len() {
            lines.remove(index);
        }

        for (offset, line) in self.lines.iter().enumerate().skip(index) {
            if let Some(slot) = self.positions.get_mut(line.item().id()) {
                *slot = offset;
            }
        }

        debug!(item_id, "removed item from cart");

        self.publish()
    }

    /// Set the quantity of an existing line. A quantity of zero or below removes it.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`]: there is no line for `item_id`, whatever the quantity.
    /// - [`CartError::QuantityLimitExceeded`]: `quantity` exceeds the per-line limit and the policy rejects.
    pub fn set_quantity(
        &mut self,
        item_id: &str,
        quantity: i64,
    ) -> Result<CartSnapshot<'a>, CartError> {
        let Some(index) = self.positions.get(item_id).copied() else {
            let err = CartError::LineNotFound(ItemId::from(item_id));
            log_rejection(&err);
            return Err(err);
        };

        if quantity <= 0 {
            return Ok(self.remove_item(item_id));
        }

        let quantity = self
            .config
            .quantity_policy()
            .bounded(quantity, self.config.max_line_quantity())
            .inspect_err(log_rejection)?;

        if self
            .lines
            .get(index)
            .is_some_and(|line| line.quantity() == quantity)
        {
            return Ok(self.snapshot());
        }

        if let Some(line) = Rc::make_mut(&mut self.lines).get_mut(index) {
            line.set_quantity(quantity);
        }

        debug!(item_id, quantity = quantity.get(), "set cart line quantity");

        Ok(self.publish())
    }

    /// Remove every line.
    pub fn clear(&mut self) -> CartSnapshot<'a> {
        if self.is_empty() {
            return self.snapshot();
        }

        self.lines = Rc::default();
        self.positions.clear();

        debug!("cleared cart");

        self.publish()
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
        pricing::total_price(&self.lines, self.config.currency())
    }

    /// Returns the line for `item_id`, if present.
    pub fn line(&self, item_id: &str) -> Option<&CartLine<'a>> {
        self.positions
            .get(item_id)
            .and_then(|&index| self.lines.get(index))
    }

    /// Lines in the order their items were first added.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Number of distinct items in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.config.currency()
    }

    /// Get the configuration the cart was created with.
    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// Immutable view of the current state.
    pub fn snapshot(&self) -> CartSnapshot<'a> {
        CartSnapshot::new(Rc::clone(&self.lines), self.config.currency())
    }

    /// Register an observer to be called after every change.
    pub fn subscribe(&mut self, observer: impl CartObserver<'a> + 'a) -> SubscriptionKey {
        self.subscribers.insert(Box::new(observer))
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.subscribers.remove(key).is_some()
    }

    fn check_item(&self, item: &Item<'a>) -> Result<(), CartError> {
        let item_currency = item.price().currency();
        let cart_currency = self.config.currency();

        if item_currency != cart_currency {
            return Err(CartError::CurrencyMismatch {
                item: item.id().clone(),
                item_currency: item_currency.iso_alpha_code,
                cart_currency: cart_currency.iso_alpha_code,
            });
        }

        if item.price().to_minor_units() < 0 {
            return Err(CartError::NegativePrice(item.id().clone()));
        }

        Ok(())
    }

    fn publish(&mut self) -> CartSnapshot<'a> {
        let snapshot = self.snapshot();

        for observer in self.subscribers.values_mut() {
            observer.on_change(&snapshot);
        }

        snapshot
    }
}

impl fmt::Debug for Cart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("lines", &self.lines)
            .field("config", &self.config)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

fn log_rejection(err: &CartError) {
    warn!(error = %err, "rejected cart update");
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::{observers::NoopObserver, quantity::QuantityPolicy};

    use super::*;

    fn item<'a>(id: &str, minor: i64) -> Item<'a> {
        Item::new(id, id.to_uppercase(), Money::from_minor(minor, GBP))
    }

    fn cart<'a>() -> Cart<'a> {
        Cart::new(CartConfig::new(GBP))
    }

    fn recorder<'a>(cart: &mut Cart<'a>) -> Rc<RefCell<Vec<CartSnapshot<'a>>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        cart.subscribe(move |snapshot: &CartSnapshot<'a>| sink.borrow_mut().push(snapshot.clone()));

        seen
    }

    #[test]
    fn add_item_creates_line() -> TestResult {
        let mut cart = cart();

        cart.add_item(item("p1", 1000), 2)?;

        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_price()?, Money::from_minor(2000, GBP));

        Ok(())
    }

    #[test]
    fn repeated_adds_aggregate_into_one_line() -> TestResult {
        let mut cart = cart();

        cart.add_item(item("p1", 1000), 2)?;
        cart.add_item(item("p1", 1000), 3)?;

        let line = cart.line("p1").ok_or("missing line")?;

        assert_eq!(line.quantity().get(), 5);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_price()?, Money::from_minor(5000, GBP));

        Ok(())
    }

    #[test]
    fn add_one_adds_single_unit() -> TestResult {
        let mut cart = cart();

        cart.add_one(item("p1", 100))?;
        cart.add_one(item("p1", 100))?;

        assert_eq!(cart.total_items(), 2);

        Ok(())
    }

    #[test]
    fn readd_keeps_original_item_data() -> TestResult {
        let mut cart = cart();

        cart.add_item(item("p1", 1000), 1)?;
        cart.add_item(Item::new("p1", "Renamed", Money::from_minor(1, GBP)), 1)?;

        let line = cart.line("p1").ok_or("missing line")?;

        assert_eq!(line.item().title(), "P1");
        assert_eq!(cart.total_price()?, Money::from_minor(2000, GBP));

        Ok(())
    }

    #[test]
    fn remove_item_drops_line_and_updates_totals() -> TestResult {
        let mut cart = cart();

        cart.add_item(item("p1", 1000), 2)?;
        cart.add_item(item("p2", 500), 1)?;
        cart.remove_item("p1");

        assert_eq!(cart.total_items(), 1);
        assert_eq!(cart.total_price()?, Money::from_minor(500, GBP));
        assert!(cart.line("p1").is_none());

        Ok(())
    }

    #[test]
    fn remove_item_keeps_positions_consistent() -> TestResult {
        let mut cart = cart();

        for id in ["a", "b", "c", "d"] {
            cart.add_one(item(id, 100))?;
        }

        cart.remove_item("b");
        cart.set_quantity("d", 4)?;

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.item().id().as_str()).collect();

        assert_eq!(ids, ["a", "c", "d"]);
        assert_eq!(cart.line("d").map(|l| l.quantity().get()), Some(4));
        assert_eq!(cart.line("c").map(|l| l.quantity().get()), Some(1));

        Ok(())
    }

    #[test]
    fn remove_item_is_idempotent() -> TestResult {
        let mut cart = cart();

        cart.add_item(item("p1", 1000), 2)?;
        cart.add_item(item("p2", 500), 1)?;

        let once = cart.remove_item("p1");
        let twice = cart.remove_item("p1");

        assert_eq!(once, twice);

        Ok(())
    }

    #[test]
    fn set_quantity_replaces_quantity() -> TestResult {
        let mut cart = cart();

        cart.add_item(item("p1", 250), 2)?;
        cart.set_quantity("p1", 7)?;

        assert_eq!(cart.total_items(), 7);
        assert_eq!(cart.total_price()?, Money::from_minor(1750, GBP));

        Ok(())
    }

    #[test]
    fn set_quantity_zero_removes_line() -> TestResult {
        let mut cart = cart();

        cart.add_item(item("p1", 1000), 2)?;
        cart.set_quantity("p1", 0)?;

        assert!(cart.line("p1").is_none());
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_negative_removes_line() -> TestResult {
        let mut cart = cart();

        cart.add_item(item("p1", 1000), 2)?;
        cart.set_quantity("p1", -3)?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_on_missing_line_is_rejected() {
        let mut cart = cart();

        let result = cart.set_quantity("ghost", 3);

        assert!(matches!(result, Err(CartError::LineNotFound(id)) if id.as_str() == "ghost"));
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_on_missing_line_rejects_non_positive() {
        let mut cart = cart();
        let seen = recorder(&mut cart);

        for quantity in [0, -1, i64::MIN] {
            let result = cart.set_quantity("ghost", quantity);

            assert!(matches!(result, Err(CartError::LineNotFound(id)) if id.as_str() == "ghost"));
        }

        assert!(cart.is_empty());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn clear_empties_cart() -> TestResult {
        let mut cart = cart();

        cart.add_item(item("p1", 1000), 2)?;
        cart.add_item(item("p2", 500), 1)?;

        let snapshot = cart.clear();

        assert_eq!(cart.total_items(), 0);
        assert!(cart.lines().is_empty());
        assert!(snapshot.is_empty());
        assert_eq!(cart.total_price()?, Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn reject_policy_refuses_non_positive_add() -> TestResult {
        let mut cart = cart();
        let seen = recorder(&mut cart);

        cart.add_item(item("p1", 100), 1)?;

        assert!(matches!(
            cart.add_item(item("p1", 100), 0),
            Err(CartError::InvalidQuantity(0))
        ));
        assert!(matches!(
            cart.add_item(item("p2", 100), -1),
            Err(CartError::InvalidQuantity(-1))
        ));
        assert_eq!(cart.total_items(), 1);
        assert_eq!(seen.borrow().len(), 1);

        Ok(())
    }

    #[test]
    fn clamp_policy_adds_at_least_one() -> TestResult {
        let config = CartConfig::new(GBP).with_quantity_policy(QuantityPolicy::Clamp);
        let mut cart = Cart::new(config);

        cart.add_item(item("p1", 100), -4)?;

        assert_eq!(cart.total_items(), 1);

        Ok(())
    }

    #[test]
    fn line_limit_rejects_or_clamps() -> TestResult {
        let limit = Quantity::new(5).ok_or("limit")?;

        let mut strict = Cart::new(CartConfig::new(GBP).with_max_line_quantity(limit));
        strict.add_item(item("p1", 100), 4)?;

        assert!(matches!(
            strict.add_item(item("p1", 100), 2),
            Err(CartError::QuantityLimitExceeded { requested: 6, .. })
        ));
        assert!(matches!(
            strict.set_quantity("p1", 9),
            Err(CartError::QuantityLimitExceeded { requested: 9, .. })
        ));
        assert_eq!(strict.total_items(), 4);

        let mut lenient = Cart::new(
            CartConfig::new(GBP)
                .with_max_line_quantity(limit)
                .with_quantity_policy(QuantityPolicy::Clamp),
        );
        lenient.add_item(item("p1", 100), 4)?;
        lenient.add_item(item("p1", 100), 2)?;

        assert_eq!(lenient.total_items(), 5);

        lenient.set_quantity("p1", 3)?;
        let snapshot = lenient.set_quantity("p1", 99)?;

        assert_eq!(snapshot.line("p1").map(CartLine::quantity), Some(limit));
        assert_eq!(lenient.total_items(), 5);

        Ok(())
    }

    #[test]
    fn currency_mismatch_is_rejected() {
        let mut cart = cart();

        let result = cart.add_item(Item::new("p1", "Bagel", Money::from_minor(100, USD)), 1);

        match result {
            Err(CartError::CurrencyMismatch {
                item,
                item_currency,
                cart_currency,
            }) => {
                assert_eq!(item.as_str(), "p1");
                assert_eq!(item_currency, USD.iso_alpha_code);
                assert_eq!(cart_currency, GBP.iso_alpha_code);
            }
            other => panic!("expected CurrencyMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut cart = cart();

        let result = cart.add_item(item("p1", -100), 1);

        assert!(matches!(result, Err(CartError::NegativePrice(_))));
        assert!(cart.is_empty());
    }

    #[test]
    fn each_change_notifies_once_with_applied_state() -> TestResult {
        let mut cart = cart();
        let seen = recorder(&mut cart);

        cart.add_item(item("p1", 1000), 2)?;
        cart.add_item(item("p1", 1000), 3)?;
        cart.set_quantity("p1", 1)?;
        cart.remove_item("p1");

        let totals: Vec<u64> = seen.borrow().iter().map(CartSnapshot::total_items).collect();

        assert_eq!(totals, [2, 5, 1, 0]);

        Ok(())
    }

    #[test]
    fn no_op_calls_do_not_notify() -> TestResult {
        let mut cart = cart();
        let seen = recorder(&mut cart);

        cart.remove_item("ghost");
        cart.clear();
        cart.add_item(item("p1", 100), 2)?;
        cart.set_quantity("p1", 2)?;
        _ = cart.set_quantity("ghost", 1);

        assert_eq!(seen.borrow().len(), 1);

        Ok(())
    }

    #[test]
    fn unsubscribed_observer_is_not_notified() -> TestResult {
        let mut cart = cart();
        let count = Rc::new(RefCell::new(0_u32));
        let sink = Rc::clone(&count);

        let key = cart.subscribe(move |_snapshot: &CartSnapshot<'_>| *sink.borrow_mut() += 1);
        cart.subscribe(NoopObserver);

        cart.add_one(item("p1", 100))?;

        assert!(cart.unsubscribe(key));
        assert!(!cart.unsubscribe(key));

        cart.add_one(item("p1", 100))?;

        assert_eq!(*count.borrow(), 1);

        Ok(())
    }

    #[test]
    fn snapshots_do_not_change_after_later_mutations() -> TestResult {
        let mut cart = cart();

        let before = cart.add_item(item("p1", 1000), 2)?;
        cart.add_item(item("p1", 1000), 3)?;
        cart.add_item(item("p2", 500), 1)?;
        cart.clear();

        assert_eq!(before.total_items(), 2);
        assert_eq!(before.len(), 1);
        assert_eq!(before.total_price()?, Money::from_minor(2000, GBP));

        Ok(())
    }

    #[test]
    fn debug_reports_subscriber_count() {
        let mut cart = cart();
        cart.subscribe(NoopObserver);

        let debug = format!("{cart:?}");

        assert!(debug.contains("subscribers: 1"));
    }
}
