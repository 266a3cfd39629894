//! Catalog
//!
//! Item records as served by the product catalog, loaded from YAML:
//!
//! ```yaml
//! items:
//!   p1:
//!     title: Sourdough Loaf
//!     price: "3.80 GBP"
//!     vendor_id: v-bakehouse
//!     vendor: The Bakehouse
//!     images: [loaf.jpg]
//! ```

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    items::{Item, ItemId, Vendor},
    pricing::{currency_from_code, parse_minor_units},
};

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading catalog files
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Price below zero
    #[error("Negative price for item {0}")]
    NegativePrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between items
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No items loaded yet
    #[error("No items loaded yet; currency unknown")]
    NoCurrency,

    /// Item not found
    #[error("Item not found: {0}")]
    ItemNotFound(String),
}

/// Wrapper for catalog records in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of item id -> record
    pub items: FxHashMap<String, CatalogRecord>,
}

/// Catalog record
#[derive(Debug, Deserialize)]
pub struct CatalogRecord {
    /// Item title
    pub title: String,

    /// Unit price (e.g., "2.99 GBP")
    pub price: String,

    /// Owning vendor id
    #[serde(default)]
    pub vendor_id: Option<String>,

    /// Owning vendor display name
    #[serde(default)]
    pub vendor: Option<String>,

    /// Image references, in display order
    #[serde(default)]
    pub images: Vec<String>,
}

impl CatalogRecord {
    fn into_item(self, id: &str) -> Result<Item<'static>, CatalogError> {
        let (minor_units, currency) = parse_price(&self.price)?;

        if minor_units < 0 {
            return Err(CatalogError::NegativePrice(id.to_string()));
        }

        let vendor = self.vendor_id.map(|vendor_id| Vendor {
            id: vendor_id,
            name: self.vendor,
        });

        Ok(
            Item::new(id, self.title, Money::from_minor(minor_units, currency))
                .with_vendor(vendor)
                .with_images(self.images),
        )
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal number, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), CatalogError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CatalogError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let minor_units =
        parse_minor_units(amount).ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))?;

    let currency =
        currency_from_code(code).ok_or_else(|| CatalogError::UnknownCurrency(code.to_string()))?;

    Ok((minor_units, currency))
}

/// Items available to add to a cart, keyed by id.
#[derive(Debug)]
pub struct Catalog {
    base_path: PathBuf,
    items: FxHashMap<ItemId, Item<'static>>,
    currency: Option<&'static Currency>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create a new empty catalog with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty catalog with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            items: FxHashMap::default(),
            currency: None,
        }
    }

    /// Load `catalog/<name>.yml` from the default base path.
    ///
    /// # Errors
    ///
    /// See [`Catalog::load`].
    pub fn from_name(name: &str) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();

        catalog.load(name)?;

        Ok(catalog)
    }

    /// Load items from `catalog/<name>.yml` under the base path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, see [`Catalog::load_str`].
    pub fn load(&mut self, name: &str) -> Result<&mut Self, CatalogError> {
        let file_path = self.base_path.join("catalog").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.load_str(&contents)
    }

    /// Load items from YAML. Nothing is added unless every record loads.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, a price is invalid or negative, or
    /// items are priced in more than one currency.
    pub fn load_str(&mut self, contents: &str) -> Result<&mut Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(contents)?;

        let mut currency = self.currency;
        let mut items = FxHashMap::default();

        for (id, record) in fixture.items {
            let item = record.into_item(&id)?;
            let item_currency = item.price().currency();

            match currency {
                Some(existing) if existing != item_currency => {
                    return Err(CatalogError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        item_currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => currency = Some(item_currency),
            }

            items.insert(ItemId::from(id), item);
        }

        self.currency = currency;
        self.items.extend(items);

        Ok(self)
    }

    /// Get an item by id, ready to add to a cart
    ///
    /// # Errors
    ///
    /// Returns an error if the item is not found.
    pub fn item(&self, id: &str) -> Result<Item<'static>, CatalogError> {
        self.items
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::ItemNotFound(id.to_string()))
    }

    /// Currency every item is priced in
    ///
    /// # Errors
    ///
    /// Returns an error if nothing has been loaded.
    pub fn currency(&self) -> Result<&'static Currency, CatalogError> {
        self.currency.ok_or(CatalogError::NoCurrency)
    }

    /// Number of items in the catalog
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
