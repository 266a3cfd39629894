//! Cartwheel
//!
//! Cartwheel is the client-side cart store of a shop front end: it aggregates selected
//! items into one line per item id, derives totals on demand and notifies subscribers
//! with an immutable snapshot after every change.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod items;
pub mod lines;
pub mod observers;
pub mod persistence;
pub mod prelude;
pub mod pricing;
pub mod quantity;
pub mod script;
pub mod snapshot;
pub mod summary;
pub mod utils;
