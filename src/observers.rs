//! Cart observers

use slotmap::new_key_type;

use crate::snapshot::CartSnapshot;

new_key_type! {
    /// Handle returned by [`Cart::subscribe`](crate::cart::Cart::subscribe).
    pub struct SubscriptionKey;
}

/// Receives a snapshot after every change to a cart.
///
/// Any `FnMut(&CartSnapshot<'a>)` closure is an observer.
pub trait CartObserver<'a> {
    /// Called once per state change, after the change is fully applied.
    fn on_change(&mut self, snapshot: &CartSnapshot<'a>);
}

impl<'a, F> CartObserver<'a> for F
where
    F: FnMut(&CartSnapshot<'a>),
{
    fn on_change(&mut self, snapshot: &CartSnapshot<'a>) {
        self(snapshot);
    }
}

/// Observer that ignores every change.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CartObserver<'_> for NoopObserver {
    fn on_change(&mut self, _snapshot: &CartSnapshot<'_>) {}
}
