//! Cart configuration

use std::{fs, path::Path};

use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    pricing::currency_from_code,
    quantity::{Quantity, QuantityPolicy},
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Per-line limit of zero
    #[error("max_line_quantity must be at least 1")]
    ZeroLineLimit,
}

/// Settings a cart is created with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartConfig {
    currency: &'static Currency,
    quantity_policy: QuantityPolicy,
    max_line_quantity: Quantity,
}

impl CartConfig {
    /// Configuration for a cart priced in `currency`, rejecting invalid quantities
    /// and with no per-line limit beyond [`Quantity::MAX`].
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            quantity_policy: QuantityPolicy::default(),
            max_line_quantity: Quantity::MAX,
        }
    }

    /// Sets the policy for out-of-range quantities.
    #[must_use]
    pub fn with_quantity_policy(mut self, policy: QuantityPolicy) -> Self {
        self.quantity_policy = policy;
        self
    }

    /// Sets the largest quantity a single line may hold.
    #[must_use]
    pub fn with_max_line_quantity(mut self, limit: Quantity) -> Self {
        self.max_line_quantity = limit;
        self
    }

    /// Parses configuration from YAML.
    ///
    /// ```yaml
    /// currency: GBP
    /// quantity_policy: clamp
    /// max_line_quantity: 20
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, the currency is unknown or the limit is zero.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: CartConfigFile = serde_norway::from_str(contents)?;

        file.try_into()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or see [`CartConfig::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Currency every item in the cart must be priced in
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Policy for out-of-range quantities
    pub fn quantity_policy(&self) -> QuantityPolicy {
        self.quantity_policy
    }

    /// Largest quantity a single line may hold
    pub fn max_line_quantity(&self) -> Quantity {
        self.max_line_quantity
    }
}

/// On-disk form of [`CartConfig`]
#[derive(Debug, Deserialize)]
struct CartConfigFile {
    currency: String,

    #[serde(default)]
    quantity_policy: QuantityPolicy,

    #[serde(default)]
    max_line_quantity: Option<u32>,
}

impl TryFrom<CartConfigFile> for CartConfig {
    type Error = ConfigError;

    fn try_from(file: CartConfigFile) -> Result<Self, Self::Error> {
        let currency = currency_from_code(&file.currency)
            .ok_or_else(|| ConfigError::UnknownCurrency(file.currency.clone()))?;

        let max_line_quantity = match file.max_line_quantity {
            Some(limit) => Quantity::new(limit).ok_or(ConfigError::ZeroLineLimit)?,
            None => Quantity::MAX,
        };

        Ok(Self {
            currency,
            quantity_policy: file.quantity_policy,
            max_line_quantity,
        })
    }
}
