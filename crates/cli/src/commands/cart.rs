//! Cart commands.
//!
//! Every command opens the file store, loads the cart, runs one operation and
//! exits. The store file is rewritten on each mutation, so consecutive
//! invocations see each other's changes.
//!
//! # Environment Variables
//!
//! - `CART_STORE_PATH` - JSON file backing the cart (default: `.gomarketplace/cart.json`)
//! - `CART_STORAGE_KEY` - Storage key holding the cart (default: `cart:products`)

use std::path::PathBuf;
use std::sync::Arc;

use gomarketplace_cart::{
    CartConfig, CartError, CartStore, ConfigError, FileStore, KeyValueStore, StorageError,
};
use gomarketplace_core::{CartLineItem, CartState, NewCartItem, ProductId};
use thiserror::Error;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Environment configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The store file could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CartOptions {
    /// Store file path.
    pub store: Option<PathBuf>,
    /// Storage key.
    pub key: Option<String>,
}

impl CartOptions {
    /// Resolve the effective configuration from the environment and overrides.
    fn config(&self) -> Result<CartConfig, CommandError> {
        let mut config = CartConfig::from_env()?;
        if let Some(store) = &self.store {
            config.store_path.clone_from(store);
        }
        if let Some(key) = &self.key {
            config.storage_key.clone_from(key);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Open the store and load the cart.
async fn open(options: &CartOptions) -> Result<CartStore, CommandError> {
    let config = options.config()?;
    let storage = Arc::new(FileStore::open(&config.store_path).await?);

    let mut cart = CartStore::from_config(storage, &config);
    cart.initialize().await?;

    Ok(cart)
}

/// Show the cart.
pub async fn list(options: &CartOptions) -> Result<(), CommandError> {
    let cart = open(options).await?;
    print_cart(cart.state());
    Ok(())
}

/// Add one unit of a product.
pub async fn add(options: &CartOptions, item: NewCartItem) -> Result<(), CommandError> {
    let mut cart = open(options).await?;
    let id = item.id.clone();
    cart.add_to_cart(item).await?;

    tracing::info!(product_id = %id, "Added to cart");
    print_cart(cart.state());
    Ok(())
}

/// Add one unit to a product already in the cart.
pub async fn increment(options: &CartOptions, id: &ProductId) -> Result<(), CommandError> {
    let mut cart = open(options).await?;
    cart.increment(id).await?;
    print_cart(cart.state());
    Ok(())
}

/// Remove one unit of a product.
pub async fn decrement(options: &CartOptions, id: &ProductId) -> Result<(), CommandError> {
    let mut cart = open(options).await?;
    cart.decrement(id).await?;
    print_cart(cart.state());
    Ok(())
}

/// Print the persisted cart value.
#[allow(clippy::print_stdout)]
pub async fn dump(options: &CartOptions) -> Result<(), CommandError> {
    let config = options.config()?;
    let storage = FileStore::open(&config.store_path).await?;

    match storage.get(&config.storage_key).await? {
        Some(raw) => println!("{raw}"),
        None => tracing::info!(key = %config.storage_key, "No cart stored under this key"),
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(state: &CartState) {
    for line in render_cart(state) {
        println!("{line}");
    }
}

/// Render the cart as table rows followed by a summary line.
fn render_cart(state: &CartState) -> Vec<String> {
    if state.is_empty() {
        return vec!["Cart is empty".to_string()];
    }

    let mut lines: Vec<String> = state.iter().map(format_line).collect();
    lines.push(format!(
        "{} product(s), {} unit(s)",
        state.len(),
        state.total_quantity()
    ));
    lines
}

fn format_line(item: &CartLineItem) -> String {
    format!(
        "{:<12} {:<32} {:>10} x{}",
        item.id, item.title, item.price, item.quantity
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gomarketplace_core::Price;

    use super::*;

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render_cart(&CartState::new()), vec!["Cart is empty"]);
    }

    #[test]
    fn test_render_cart_rows_and_summary() {
        let mut state = CartState::new();
        state.upsert(NewCartItem::new("p1", "Widget", "x", Price::from_cents(999)));
        state.upsert(NewCartItem::new("p1", "Widget", "x", Price::from_cents(999)));
        state.upsert(NewCartItem::new("p2", "Gadget", "y", Price::from_cents(50)));

        let lines = render_cart(&state);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("p1"));
        assert!(lines[0].contains("Widget"));
        assert!(lines[0].ends_with("9.99 x2"));
        assert!(lines[1].ends_with("0.50 x1"));
        assert_eq!(lines[2], "2 product(s), 3 unit(s)");
    }

    #[tokio::test]
    async fn test_empty_key_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let options = CartOptions {
            store: Some(dir.path().join("cart.json")),
            key: Some("  ".to_string()),
        };

        let err = list(&options).await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::Config(ConfigError::InvalidEnvVar(key, _)) if key == "CART_STORAGE_KEY"
        ));
        assert!(!dir.path().join("cart.json").exists());
    }

    #[tokio::test]
    async fn test_commands_share_the_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let options = CartOptions {
            store: Some(dir.path().join("cart.json")),
            key: Some("cart:test".to_string()),
        };

        add(&options, NewCartItem::new("p1", "Widget", "x", Price::from_cents(999)))
            .await
            .unwrap();
        increment(&options, &ProductId::new("p1")).await.unwrap();
        decrement(&options, &ProductId::new("missing")).await.unwrap();

        let cart = open(&options).await.unwrap();
        assert_eq!(cart.key(), "cart:test");
        assert_eq!(cart.products().first().unwrap().quantity.get(), 2);
    }
}
