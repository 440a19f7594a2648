//! Shared access point for the application's cart.

use std::sync::{Arc, OnceLock};

use tokio::sync::{Mutex, MutexGuard};

use crate::error::{CartError, Result};
use crate::store::CartStore;

/// Hands out the single [`CartStore`] of an application.
///
/// The context is cheaply cloneable via `Arc`; every clone sees the same
/// store. It starts empty: the store is installed once with
/// [`CartContext::provide`], and asking for the cart before that fails with
/// [`CartError::NotInitialized`]. Callers holding the guard returned by
/// [`CartContext::cart`] have exclusive access, so cart operations from
/// different tasks run one after another.
#[derive(Debug, Clone, Default)]
pub struct CartContext {
    inner: Arc<OnceLock<Mutex<CartStore>>>,
}

impl CartContext {
    /// Create a context with no cart yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the application's cart store.
    ///
    /// The store should already be initialized.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AlreadyProvided`] if a store was installed before.
    pub fn provide(&self, store: CartStore) -> Result<()> {
        self.inner
            .set(Mutex::new(store))
            .map_err(|_| CartError::AlreadyProvided)?;
        tracing::debug!("Cart store provided");
        Ok(())
    }

    /// Whether a store has been installed.
    #[must_use]
    pub fn is_provided(&self) -> bool {
        self.inner.get().is_some()
    }

    /// Lock the cart for use.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInitialized`] if no store was provided.
    pub async fn cart(&self) -> Result<MutexGuard<'_, CartStore>> {
        let store = self.inner.get().ok_or(CartError::NotInitialized)?;
        Ok(store.lock().await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gomarketplace_core::{NewCartItem, Price, ProductId};

    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> CartStore {
        CartStore::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_cart_before_provide() {
        let context = CartContext::new();
        assert!(!context.is_provided());
        assert!(matches!(
            context.cart().await,
            Err(CartError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_provide_twice() {
        let context = CartContext::new();
        context.provide(store()).unwrap();
        assert!(matches!(
            context.provide(store()),
            Err(CartError::AlreadyProvided)
        ));
    }

    #[tokio::test]
    async fn test_clones_share_the_cart() {
        let context = CartContext::new();
        let other = context.clone();
        context.provide(store()).unwrap();

        context
            .cart()
            .await
            .unwrap()
            .add_to_cart(NewCartItem::new("p1", "Widget", "x", Price::from_cents(100)))
            .await
            .unwrap();

        let cart = other.cart().await.unwrap();
        assert!(cart.state().contains(&ProductId::new("p1")));
    }

    #[tokio::test]
    async fn test_concurrent_tasks_are_serialized() {
        let context = CartContext::new();
        context.provide(store()).unwrap();
        {
            let mut cart = context.cart().await.unwrap();
            cart.add_to_cart(NewCartItem::new("p1", "Widget", "x", Price::from_cents(100)))
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..10 {
            let context = context.clone();
            handles.push(tokio::spawn(async move {
                let mut cart = context.cart().await.unwrap();
                cart.increment(&ProductId::new("p1")).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let cart = context.cart().await.unwrap();
        assert_eq!(cart.products().first().unwrap().quantity.get(), 11);
    }
}
