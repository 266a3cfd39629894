//! Summary
//!
//! Terminal rendering of a cart snapshot.

use std::io;

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{pricing::TotalPriceError, snapshot::CartSnapshot};

/// Errors that can occur when rendering a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Error calculating a line or cart total.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CartSnapshot<'_> {
    /// Writes the cart as a table followed by item count and total.
    ///
    /// # Errors
    ///
    /// Returns an error if a total overflows or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Vendor", "Unit Price", "Qty", "Line Total"]);

        for line in self.iter() {
            let item = line.item();
            let vendor = item.vendor().map_or("", |vendor| {
                vendor.name.as_deref().unwrap_or(vendor.id.as_str())
            });

            builder.push_record([
                item.title().to_string(),
                vendor.to_string(),
                item.price().to_string(),
                line.quantity().to_string(),
                line.total()?.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "\n{table}")?;
        writeln!(out, " Items: {}", self.total_items())?;
        writeln!(out, " \x1b[1mTotal: {}\x1b[0m", self.total_price()?)?;
        writeln!(out)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::{
        cart::Cart,
        config::CartConfig,
        items::{Item, Vendor},
    };

    fn render(cart: &Cart<'_>) -> Result<String, Box<dyn std::error::Error>> {
        let mut out = Vec::new();

        cart.snapshot().write_to(&mut out)?;

        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn write_to_renders_lines_and_totals() -> TestResult {
        let mut cart = Cart::new(CartConfig::new(GBP));

        cart.add_item(
            Item::new("p1", "Sourdough Loaf", Money::from_minor(380, GBP)).with_vendor(Vendor {
                id: "v1".to_string(),
                name: Some("The Bakehouse".to_string()),
            }),
            2,
        )?;
        cart.add_item(Item::new("p2", "Butter", Money::from_minor(250, GBP)), 1)?;

        let output = render(&cart)?;

        assert!(output.contains("Sourdough Loaf"));
        assert!(output.contains("The Bakehouse"));
        assert!(output.contains("£3.80"));
        assert!(output.contains("£7.60"));
        assert!(output.contains("Items: 3"));
        assert!(output.contains("£10.10"));

        Ok(())
    }

    #[test]
    fn write_to_falls_back_to_vendor_id() -> TestResult {
        let mut cart = Cart::new(CartConfig::new(GBP));

        cart.add_one(
            Item::new("p1", "Jam", Money::from_minor(300, GBP)).with_vendor(Vendor {
                id: "v-orchard".to_string(),
                name: None,
            }),
        )?;

        assert!(render(&cart)?.contains("v-orchard"));

        Ok(())
    }

    #[test]
    fn write_to_renders_empty_cart() -> TestResult {
        let cart = Cart::new(CartConfig::new(GBP));

        let output = render(&cart)?;

        assert!(output.contains("Items: 0"));
        assert!(output.contains("£0.00"));

        Ok(())
    }
}
