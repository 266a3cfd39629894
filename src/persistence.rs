//! Persistence
//!
//! Saving a cart is done by composing it with an observer, the cart itself
//! never touches storage.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rusty_money::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartError},
    config::CartConfig,
    items::{Item, ItemId, Vendor},
    observers::CartObserver,
    pricing::currency_from_code,
    quantity::Quantity,
    snapshot::CartSnapshot,
};

/// Errors saving or restoring a cart
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// IO error reading or writing the saved cart
    #[error("Failed to access saved cart: {0}")]
    Io(#[from] std::io::Error),

    /// YAML encoding or decoding error
    #[error("Failed to encode or decode YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A saved line could not be added back to the cart
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Serialisable contents of a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCart {
    /// ISO currency code
    pub currency: String,

    /// Lines, in cart order
    #[serde(default)]
    pub lines: Vec<SavedLine>,
}

/// Serialisable cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLine {
    /// Item id
    pub id: ItemId,

    /// Item title
    pub title: String,

    /// Unit price in minor units
    pub price: i64,

    /// Owning vendor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,

    /// Image references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,

    /// Units held
    pub quantity: Quantity,
}

impl From<&CartSnapshot<'_>> for SavedCart {
    fn from(snapshot: &CartSnapshot<'_>) -> Self {
        let lines = snapshot
            .iter()
            .map(|line| {
                let item = line.item();

                SavedLine {
                    id: item.id().clone(),
                    title: item.title().to_string(),
                    price: item.price().to_minor_units(),
                    vendor: item.vendor().cloned(),
                    images: item.images().to_vec(),
                    quantity: line.quantity(),
                }
            })
            .collect();

        Self {
            currency: snapshot.currency().iso_alpha_code.to_string(),
            lines,
        }
    }
}

impl SavedCart {
    /// Encodes the saved cart as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_yaml(&self) -> Result<String, PersistenceError> {
        Ok(serde_norway::to_string(self)?)
    }

    /// Decodes a saved cart from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml_str(contents: &str) -> Result<Self, PersistenceError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Reads a saved cart from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Writes the saved cart to a YAML file, replacing it.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        fs::write(path, self.to_yaml()?)?;

        Ok(())
    }

    /// Builds a cart holding these lines. No observers are attached yet, so
    /// restoring produces no notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved currency is unknown, or if a line is rejected by
    /// the cart (for example, a currency different to `config` or a quantity over the limit).
    pub fn into_cart(self, config: CartConfig) -> Result<Cart<'static>, PersistenceError> {
        let currency = currency_from_code(&self.currency)
            .ok_or_else(|| PersistenceError::UnknownCurrency(self.currency.clone()))?;

        let mut cart = Cart::new(config);

        for line in self.lines {
            let item = Item::new(line.id, line.title, Money::from_minor(line.price, currency))
                .with_vendor(line.vendor)
                .with_images(line.images);

            cart.add_item(item, i64::from(line.quantity.get()))?;
        }

        debug!(lines = cart.len(), "restored saved cart");

        Ok(cart)
    }
}

/// Observer that rewrites a YAML file with the cart contents after every change.
///
/// Write failures are logged and do not affect the cart.
#[derive(Debug, Clone)]
pub struct YamlCartWriter {
    path: PathBuf,
}

impl YamlCartWriter {
    /// Creates a writer targeting `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the cart is written to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartObserver<'_> for YamlCartWriter {
    fn on_change(&mut self, snapshot: &CartSnapshot<'_>) {
        match SavedCart::from(snapshot).save(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "saved cart"),
            Err(err) => warn!(path = %self.path.display(), error = %err, "failed to save cart"),
        }
    }
}
