//! GoMarketplace Cart - Persistent shopping cart store.
//!
//! [`CartStore`] owns the cart's line items and writes the whole cart back to a
//! [`KeyValueStore`] after every mutation, so the cart survives restarts.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use gomarketplace_cart::{CartStore, MemoryStore};
//! use gomarketplace_core::{NewCartItem, Price, ProductId};
//!
//! # async fn run() -> gomarketplace_cart::Result<()> {
//! let mut cart = CartStore::new(Arc::new(MemoryStore::new()));
//! cart.initialize().await?;
//!
//! cart.add_to_cart(NewCartItem::new("p1", "Widget", "http://img/p1.png", Price::from_cents(999)))
//!     .await?;
//! cart.increment(&ProductId::new("p1")).await?;
//!
//! assert_eq!(cart.products()[0].quantity.get(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`store`] - The cart store and its operations
//! - [`context`] - Shared access point handing out the application's cart
//! - [`storage`] - Key-value storage contract and backends
//! - [`snapshot`] - Persisted cart format
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod context;
pub mod error;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError};
pub use context::CartContext;
pub use error::{CartError, Result};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartStore, DEFAULT_CART_KEY};
