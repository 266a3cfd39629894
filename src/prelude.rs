//! Cartwheel prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError},
    catalog::{Catalog, CatalogError},
    config::{CartConfig, ConfigError},
    items::{Item, ItemId, Vendor},
    lines::CartLine,
    observers::{CartObserver, NoopObserver, SubscriptionKey},
    persistence::{PersistenceError, SavedCart, YamlCartWriter},
    pricing::TotalPriceError,
    quantity::{Quantity, QuantityPolicy},
    script::{CartAction, CartScript, ScriptError, ScriptQuantity},
    snapshot::CartSnapshot,
    summary::SummaryError,
};
