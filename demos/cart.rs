//! Cart Example
//!
//! Replays an action script against a cart and prints the resulting cart.
//!
//! Use `-c` to pick a catalog fixture by name
//! Use `-s` to pick an action script by name
//! Use `--config` to load cart settings from a YAML file
//! Use `-o` to keep a YAML copy of the cart, rewritten after every change
//!
//! Set `RUST_LOG=debug` to see each cart change as it happens.

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cartwheel::{
    prelude::{Cart, CartConfig, CartScript, CartSnapshot, Catalog, YamlCartWriter},
    utils::ExampleCartArgs,
};

/// Cart Example
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = ExampleCartArgs::parse();

    let catalog = Catalog::from_name(&args.catalog)?;

    let config = match args.config.as_deref() {
        Some(path) => CartConfig::load(path)?,
        None => CartConfig::new(catalog.currency()?),
    };

    let mut cart = Cart::new(config);

    cart.subscribe(|snapshot: &CartSnapshot<'_>| {
        info!(
            lines = snapshot.len(),
            items = snapshot.total_items(),
            "cart changed"
        );
    });

    if let Some(out) = args.out {
        cart.subscribe(YamlCartWriter::new(out));
    }

    let script = CartScript::from_name(&args.script)?;
    let snapshot = script.apply(&mut cart, &catalog)?;

    let stdout = io::stdout();
    snapshot.write_to(stdout.lock())?;

    Ok(())
}
