//! The cart store.
//!
//! [`CartStore`] owns the application's [`CartState`] and keeps the copy in
//! storage in step with it. Every mutation updates memory first, then writes
//! the full cart under the cart key exactly once. A failed write is returned
//! to the caller and memory is not rolled back; the next successful mutation
//! brings storage up to date again.
//!
//! Mutations take `&mut self`, so one store cannot be mutated from two places
//! at once. Share it through [`crate::CartContext`] when several parts of an
//! application need it.

use std::fmt;
use std::sync::Arc;

use gomarketplace_core::{CartLineItem, CartState, DecrementOutcome, NewCartItem, ProductId};
use tracing::{debug, info, instrument, warn};

use crate::config::CartConfig;
use crate::error::Result;
use crate::snapshot;
use crate::storage::KeyValueStore;

/// Storage key holding the persisted cart.
pub const DEFAULT_CART_KEY: &str = "cart:products";

/// Shopping cart backed by a key-value store.
pub struct CartStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    state: CartState,
}

impl CartStore {
    /// Create an empty cart persisted under [`DEFAULT_CART_KEY`].
    ///
    /// Call [`CartStore::initialize`] before mutating, otherwise the first
    /// write replaces whatever cart was saved.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(storage, DEFAULT_CART_KEY)
    }

    /// Create an empty cart persisted under a custom key.
    #[must_use]
    pub fn with_key(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            state: CartState::new(),
        }
    }

    /// Create an empty cart using the key from configuration.
    #[must_use]
    pub fn from_config(storage: Arc<dyn KeyValueStore>, config: &CartConfig) -> Self {
        Self::with_key(storage, config.storage_key.clone())
    }

    /// Load the saved cart, if any.
    ///
    /// An absent value leaves the cart empty.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the read fails, and
    /// `CartError::Corrupt` or `CartError::UnsupportedSchemaVersion` if the
    /// saved value cannot be decoded. The in-memory cart is left unchanged on
    /// error; corrupt data is never silently discarded.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn initialize(&mut self) -> Result<()> {
        match self.storage.get(&self.key).await? {
            Some(raw) => {
                self.state = snapshot::decode(&raw)?;
                info!(
                    lines = self.state.len(),
                    units = self.state.total_quantity(),
                    "Cart loaded"
                );
            }
            None => {
                self.state = CartState::new();
                debug!("No saved cart, starting empty");
            }
        }
        Ok(())
    }

    /// Current line items, in insertion order.
    ///
    /// Returns a copy; changing it does not touch the cart.
    #[must_use]
    pub fn products(&self) -> Vec<CartLineItem> {
        self.state.items().to_vec()
    }

    /// Read-only view of the current cart.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Storage key the cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart takes the candidate's title, image and
    /// price and its quantity grows by one. A new product is appended with
    /// quantity one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if persisting fails.
    #[instrument(skip(self, item), fields(key = %self.key, product_id = %item.id))]
    pub async fn add_to_cart(&mut self, item: NewCartItem) -> Result<()> {
        let quantity = self.state.upsert(item);
        debug!(quantity = quantity.get(), "Product added");
        self.persist().await
    }

    /// Add one unit to a product already in the cart.
    ///
    /// An unknown ID leaves the cart unchanged; the cart is still persisted.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if persisting fails.
    #[instrument(skip(self), fields(key = %self.key, product_id = %id))]
    pub async fn increment(&mut self, id: &ProductId) -> Result<()> {
        match self.state.increment(id) {
            Some(quantity) => debug!(quantity = quantity.get(), "Quantity incremented"),
            None => warn!("Increment for product not in cart"),
        }
        self.persist().await
    }

    /// Remove one unit of a product; a product at quantity one leaves the
    /// cart.
    ///
    /// An unknown ID leaves the cart unchanged; the cart is still persisted.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if persisting fails.
    #[instrument(skip(self), fields(key = %self.key, product_id = %id))]
    pub async fn decrement(&mut self, id: &ProductId) -> Result<()> {
        match self.state.decrement(id) {
            DecrementOutcome::Decremented(quantity) => {
                debug!(quantity = quantity.get(), "Quantity decremented");
            }
            DecrementOutcome::Removed => debug!("Product removed from cart"),
            DecrementOutcome::Missing => warn!("Decrement for product not in cart"),
        }
        self.persist().await
    }

    async fn persist(&self) -> Result<()> {
        let payload = snapshot::encode(&self.state)?;
        self.storage.set(&self.key, payload).await?;
        Ok(())
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gomarketplace_core::Price;

    use super::*;
    use crate::error::CartError;
    use crate::storage::{MemoryStore, StorageError};

    fn widget(cents: i64) -> NewCartItem {
        NewCartItem::new("p1", "Widget", "http://img/p1.png", Price::from_cents(cents))
    }

    async fn store_with(json: &str) -> (Arc<MemoryStore>, CartStore) {
        let storage = Arc::new(MemoryStore::with_entries([(DEFAULT_CART_KEY, json)]));
        let mut cart = CartStore::new(storage.clone());
        cart.initialize().await.unwrap();
        (storage, cart)
    }

    #[tokio::test]
    async fn test_initialize_without_saved_cart() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::new(storage.clone());
        cart.initialize().await.unwrap();

        assert!(cart.products().is_empty());
        assert_eq!(storage.write_count(), 0);
    }

    #[tokio::test]
    async fn test_initialize_loads_saved_cart() {
        let (_, cart) = store_with(
            r#"[{"id":"p1","title":"Widget","imageUrl":"x","price":9.99,"quantity":2}]"#,
        )
        .await;

        let products = cart.products();
        assert_eq!(products.len(), 1);
        assert_eq!(products.first().unwrap().quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_initialize_fails_on_corrupt_data() {
        let storage = Arc::new(MemoryStore::with_entries([(DEFAULT_CART_KEY, "{oops")]));
        let mut cart = CartStore::new(storage);

        let err = cart.initialize().await.unwrap_err();
        assert!(matches!(err, CartError::Corrupt(_)));
        assert!(cart.state().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_storage_unavailable() {
        let storage = Arc::new(MemoryStore::new());
        storage.set_unavailable(true);
        let mut cart = CartStore::new(storage);

        let err = cart.initialize().await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Storage(StorageError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_add_three_times() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::new(storage.clone());
        cart.initialize().await.unwrap();

        for _ in 0..3 {
            cart.add_to_cart(widget(500)).await.unwrap();
        }

        let products = cart.products();
        assert_eq!(products.len(), 1);
        assert_eq!(products.first().unwrap().quantity.get(), 3);
        assert_eq!(storage.write_count(), 3);
    }

    #[tokio::test]
    async fn test_add_persists_resulting_state() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::new(storage.clone());
        cart.initialize().await.unwrap();

        cart.add_to_cart(widget(999)).await.unwrap();

        let raw = storage.get(DEFAULT_CART_KEY).await.unwrap().unwrap();
        assert_eq!(
            raw,
            r#"[{"id":"p1","title":"Widget","imageUrl":"http://img/p1.png","price":9.99,"quantity":1}]"#
        );
    }

    #[tokio::test]
    async fn test_add_refreshes_metadata() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::new(storage);
        cart.add_to_cart(widget(999)).await.unwrap();
        cart.add_to_cart(widget(899)).await.unwrap();

        let item = cart.products().into_iter().next().unwrap();
        assert_eq!(item.price, Price::from_cents(899));
        assert_eq!(item.quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_increment_missing_still_persists() {
        let (storage, mut cart) = store_with(
            r#"[{"id":"p1","title":"Widget","imageUrl":"x","price":1,"quantity":1}]"#,
        )
        .await;
        let before = cart.products();

        cart.increment(&ProductId::new("p2")).await.unwrap();

        assert_eq!(cart.products(), before);
        assert_eq!(storage.write_count(), 1);
        let raw = storage.get(DEFAULT_CART_KEY).await.unwrap().unwrap();
        assert_eq!(snapshot::decode(&raw).unwrap().into_items(), before);
    }

    #[tokio::test]
    async fn test_decrement_at_one_removes() {
        let (storage, mut cart) = store_with(
            r#"[{"id":"p1","title":"Widget","imageUrl":"x","price":1,"quantity":1}]"#,
        )
        .await;

        cart.decrement(&ProductId::new("p1")).await.unwrap();

        assert!(cart.products().is_empty());
        assert_eq!(
            storage.get(DEFAULT_CART_KEY).await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_decrement_from_three() {
        let (_, mut cart) = store_with(
            r#"[{"id":"p1","title":"Widget","imageUrl":"x","price":1,"quantity":3}]"#,
        )
        .await;

        cart.decrement(&ProductId::new("p1")).await.unwrap();

        let products = cart.products();
        assert_eq!(products.len(), 1);
        assert_eq!(products.first().unwrap().quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_decrement_missing_still_persists() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::new(storage.clone());

        cart.decrement(&ProductId::new("ghost")).await.unwrap();

        assert_eq!(storage.write_count(), 1);
        assert_eq!(
            storage.get(DEFAULT_CART_KEY).await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_state() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::new(storage.clone());
        cart.add_to_cart(widget(100)).await.unwrap();

        storage.set_unavailable(true);
        let err = cart.increment(&ProductId::new("p1")).await.unwrap_err();
        assert!(err.is_storage());

        // Memory moved ahead of storage.
        assert_eq!(cart.products().first().unwrap().quantity.get(), 2);
        storage.set_unavailable(false);
        let raw = storage.get(DEFAULT_CART_KEY).await.unwrap().unwrap();
        assert!(raw.contains(r#""quantity":1"#));
    }

    #[tokio::test]
    async fn test_storage_full_surfaces() {
        let storage = Arc::new(MemoryStore::with_capacity(16));
        let mut cart = CartStore::new(storage);

        let err = cart.add_to_cart(widget(100)).await.unwrap_err();
        assert!(matches!(err, CartError::Storage(StorageError::Full { .. })));
    }

    #[tokio::test]
    async fn test_products_is_a_copy() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::new(storage);
        cart.add_to_cart(widget(100)).await.unwrap();

        let mut copy = cart.products();
        copy.clear();

        assert_eq!(cart.products().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_key() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::with_key(storage.clone(), "cart:guest");
        cart.add_to_cart(widget(100)).await.unwrap();

        assert_eq!(cart.key(), "cart:guest");
        assert!(storage.get("cart:guest").await.unwrap().is_some());
        assert!(storage.get(DEFAULT_CART_KEY).await.unwrap().is_none());
    }

    #[test]
    fn test_debug_output() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        let debug = format!("{cart:?}");
        assert!(debug.contains("cart:products"));
    }
}
