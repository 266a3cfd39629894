//! Utils

use clap::Parser;

/// Arguments for the cart example
#[derive(Debug, Parser)]
pub struct ExampleCartArgs {
    /// Catalog fixture to draw items from
    #[clap(short, long, default_value = "pantry")]
    pub catalog: String,

    /// Action script to replay against the cart
    #[clap(short, long, default_value = "weekly_shop")]
    pub script: String,

    /// Cart configuration file; defaults to the catalog currency with the reject policy
    #[clap(long)]
    pub config: Option<String>,

    /// Write the cart to this YAML file after every change
    #[clap(short, long)]
    pub out: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_point_at_bundled_fixtures() {
        let args = ExampleCartArgs::parse_from(["cart"]);

        assert_eq!(args.catalog, "pantry");
        assert_eq!(args.script, "weekly_shop");
        assert!(args.config.is_none());
        assert!(args.out.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let args = ExampleCartArgs::parse_from([
            "cart", "-c", "deli", "-s", "party", "--config", "cart.yml", "-o", "saved.yml",
        ]);

        assert_eq!(args.catalog, "deli");
        assert_eq!(args.script, "party");
        assert_eq!(args.config.as_deref(), Some("cart.yml"));
        assert_eq!(args.out.as_deref(), Some("saved.yml"));
    }
}
