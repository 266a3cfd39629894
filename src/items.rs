//! Items

use std::{borrow::Borrow, fmt};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Image references attached to an item, in display order.
pub type Images = SmallVec<[String; 4]>;

/// Catalog identifier of a purchasable item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new item id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Vendor that owns an item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    /// Vendor id
    pub id: String,

    /// Vendor display name, when the catalog supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A purchasable item as supplied by the catalog.
///
/// The cart only looks at the id and price; everything else is carried
/// through for display.
#[derive(Clone, Debug, PartialEq)]
pub struct Item<'a> {
    id: ItemId,
    title: String,
    price: Money<'a, Currency>,
    vendor: Option<Vendor>,
    images: Images,
}

impl<'a> Item<'a> {
    /// Creates a new item with no vendor and no images.
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            vendor: None,
            images: Images::new(),
        }
    }

    /// Sets the owning vendor; `None` clears it.
    #[must_use]
    pub fn with_vendor(mut self, vendor: impl Into<Option<Vendor>>) -> Self {
        self.vendor = vendor.into();
        self
    }

    /// Sets the image references.
    #[must_use]
    pub fn with_images(mut self, images: impl IntoIterator<Item = String>) -> Self {
        self.images = images.into_iter().collect();
        self
    }

    /// Returns the item id
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Returns the item title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the unit price of the item
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Returns the owning vendor, if any
    pub fn vendor(&self) -> Option<&Vendor> {
        self.vendor.as_ref()
    }

    /// Returns the image references
    pub fn images(&self) -> &[String] {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;

    use super::*;

    #[test]
    fn new_item_has_no_vendor_or_images() {
        let item = Item::new("p1", "Trail Mix", Money::from_minor(350, GBP));

        assert_eq!(item.id().as_str(), "p1");
        assert_eq!(item.title(), "Trail Mix");
        assert_eq!(item.price(), &Money::from_minor(350, GBP));
        assert!(item.vendor().is_none());
        assert!(item.images().is_empty());
    }

    #[test]
    fn builder_methods_attach_vendor_and_images() {
        let vendor = Vendor {
            id: "v1".to_string(),
            name: Some("Hillside Farm".to_string()),
        };

        let item = Item::new("p1", "Honey", Money::from_minor(600, GBP))
            .with_vendor(vendor.clone())
            .with_images(["front.jpg".to_string(), "back.jpg".to_string()]);

        assert_eq!(item.vendor(), Some(&vendor));
        assert_eq!(item.images(), ["front.jpg", "back.jpg"]);
    }

    #[test]
    fn item_id_borrows_as_str() {
        let id = ItemId::from("p42");
        let borrowed: &str = id.borrow();

        assert_eq!(borrowed, "p42");
        assert_eq!(id.to_string(), "p42");
    }
}
