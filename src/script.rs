//! Cart scripts
//!
//! A YAML list of cart actions replayed against a cart, with items drawn from
//! a [`Catalog`]. Quantities are untyped numbers or text, so they go through the
//! cart's [`QuantityPolicy`] before reaching it.
//!
//! ```yaml
//! actions:
//!   - { action: add, item: p1, quantity: 2 }
//!   - { action: set, item: p1, quantity: "1" }
//!   - { action: remove, item: p1 }
//!   - { action: clear }
//! ```

use std::{fs, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError},
    catalog::{Catalog, CatalogError},
    quantity::QuantityPolicy,
    snapshot::CartSnapshot,
};

/// Script errors
#[derive(Debug, Error)]
pub enum ScriptError {
    /// IO error reading the script
    #[error("Failed to read script file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// An action referenced an item the catalog does not have
    #[error("step {step}: {source}")]
    Catalog {
        /// Zero-based index of the failing action
        step: usize,
        /// Underlying catalog error
        source: CatalogError,
    },

    /// The cart rejected an action
    #[error("step {step}: {source}")]
    Cart {
        /// Zero-based index of the failing action
        step: usize,
        /// Underlying cart error
        source: CartError,
    },
}

/// One cart action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CartAction {
    /// Add units of a catalog item
    Add {
        /// Catalog item id
        item: String,
        /// Units to add, one when omitted
        #[serde(default = "default_quantity")]
        quantity: ScriptQuantity,
    },

    /// Remove an item's line
    Remove {
        /// Item id
        item: String,
    },

    /// Set an existing line's quantity
    Set {
        /// Item id
        item: String,
        /// New quantity
        quantity: ScriptQuantity,
    },

    /// Empty the cart
    Clear,
}

fn default_quantity() -> ScriptQuantity {
    ScriptQuantity::Number(1.0)
}

/// A quantity as written in a script: a YAML number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptQuantity {
    /// Numeric quantity, possibly fractional
    Number(f64),

    /// Textual quantity, e.g. `"3"`
    Text(String),
}

impl ScriptQuantity {
    /// Converts the quantity into a whole count under `policy`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`QuantityPolicy::whole`] and [`QuantityPolicy::parse`].
    pub fn resolve(&self, policy: QuantityPolicy) -> Result<i64, CartError> {
        match self {
            ScriptQuantity::Number(value) => policy.whole(*value),
            ScriptQuantity::Text(text) => policy.parse(text),
        }
    }
}

/// Ordered list of cart actions.
#[derive(Debug, Clone, Deserialize)]
pub struct CartScript {
    /// Actions, applied in order
    pub actions: Vec<CartAction>,
}

impl CartScript {
    /// Parses a script from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ScriptError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Loads `./fixtures/scripts/<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_name(name: &str) -> Result<Self, ScriptError> {
        let path = PathBuf::from("./fixtures")
            .join("scripts")
            .join(format!("{name}.yml"));

        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    /// Applies every action in order, stopping at the first failure.
    ///
    /// Actions before the failing one stay applied.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Catalog`] for unknown items and [`ScriptError::Cart`] for
    /// rejected actions, both tagged with the step index.
    pub fn apply<'a>(
        &self,
        cart: &mut Cart<'a>,
        catalog: &Catalog,
    ) -> Result<CartSnapshot<'a>, ScriptError> {
        for (step, action) in self.actions.iter().enumerate() {
            debug!(step, ?action, "applying cart action");

            apply_action(cart, catalog, action).map_err(|err| err.at(step))?;
        }

        Ok(cart.snapshot())
    }
}

enum StepError {
    Catalog(CatalogError),
    Cart(CartError),
}

impl StepError {
    fn at(self, step: usize) -> ScriptError {
        match self {
            StepError::Catalog(source) => ScriptError::Catalog { step, source },
            StepError::Cart(source) => ScriptError::Cart { step, source },
        }
    }
}

impl From<CatalogError> for StepError {
    fn from(err: CatalogError) -> Self {
        StepError::Catalog(err)
    }
}

impl From<CartError> for StepError {
    fn from(err: CartError) -> Self {
        StepError::Cart(err)
    }
}

fn apply_action(cart: &mut Cart<'_>, catalog: &Catalog, action: &CartAction) -> Result<(), StepError> {
    let policy = cart.config().quantity_policy();

    match action {
        CartAction::Add { item, quantity } => {
            let quantity = quantity.resolve(policy)?;

            cart.add_item(catalog.item(item)?, quantity)?;
        }
        CartAction::Remove { item } => {
            cart.remove_item(item);
        }
        CartAction::Set { item, quantity } => {
            let quantity = quantity.resolve(policy)?;

            cart.set_quantity(item, quantity)?;
        }
        CartAction::Clear => {
            cart.clear();
        }
    }

    Ok(())
}
