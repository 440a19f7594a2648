//! Integration tests for GoMarketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p gomarketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Load, mutate and reload carts through real backends
//! - `cart_properties` - Invariants over random operation sequences
//! - `cart_context` - Shared access point behaviour
//!
//! This library holds the helpers those tests share.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use gomarketplace_cart::{KeyValueStore, MemoryStore, StorageError};
use gomarketplace_core::{NewCartItem, Price};

/// Storage wrapper recording every write it forwards.
///
/// Lets tests assert how many times, and with what payloads, the cart hit
/// storage.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    writes: Mutex<Vec<(String, String)>>,
}

impl RecordingStore {
    /// Wrap an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an in-memory store seeded with one value.
    #[must_use]
    pub fn seeded(key: &str, value: &str) -> Self {
        Self {
            inner: MemoryStore::with_entries([(key, value)]),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Writes seen so far, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.inner.set(key, value.clone()).await?;
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((key.to_string(), value));
        Ok(())
    }
}

/// A catalog product with a predictable title, image and price.
#[must_use]
pub fn product(id: &str, cents: i64) -> NewCartItem {
    NewCartItem::new(
        id,
        format!("Product {id}"),
        format!("https://cdn.example.com/{id}.png"),
        Price::from_cents(cents),
    )
}
