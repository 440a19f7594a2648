//! Cart state and its transitions.
//!
//! [`CartState`] is the ordered list of line items held by a cart. It owns
//! the two cart invariants:
//!
//! - every product ID appears at most once
//! - every present line has a quantity of at least one
//!
//! The second is enforced by the type of [`CartLineItem::quantity`]; the first
//! by keeping the list private and only exposing the transitions below.
//! Deserializing a list with duplicate IDs fails.
//!
//! Per line item the state machine is:
//!
//! ```text
//! ABSENT --upsert--> 1 --increment/upsert--> N --decrement--> N-1 ... 1 --decrement--> ABSENT
//! ```

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize, Serializer};

use super::{CartLineItem, NewCartItem, ProductId};

/// Errors that can occur when building a [`CartState`] from raw items.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartStateError {
    /// The same product ID appears on more than one line.
    #[error("duplicate product id in cart: {0}")]
    DuplicateId(ProductId),
}

/// Result of [`CartState::decrement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// The quantity dropped by one and the line is still present.
    Decremented(NonZeroU32),
    /// The line had quantity one and was removed.
    Removed,
    /// No line matched the ID.
    Missing,
}

/// Ordered, duplicate-free list of cart line items.
///
/// ## Examples
///
/// ```
/// use gomarketplace_core::{CartState, DecrementOutcome, NewCartItem, Price, ProductId};
///
/// let mut cart = CartState::new();
/// let widget = NewCartItem::new("p1", "Widget", "http://img/p1.png", Price::from_cents(999));
///
/// cart.upsert(widget.clone());
/// cart.upsert(widget);
/// assert_eq!(cart.len(), 1);
/// assert_eq!(cart.total_quantity(), 2);
///
/// let id = ProductId::new("p1");
/// assert!(matches!(cart.decrement(&id), DecrementOutcome::Decremented(_)));
/// assert_eq!(cart.decrement(&id), DecrementOutcome::Removed);
/// assert!(cart.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<CartLineItem>")]
pub struct CartState {
    items: Vec<CartLineItem>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from line items, rejecting duplicate IDs.
    ///
    /// # Errors
    ///
    /// Returns [`CartStateError::DuplicateId`] for the first ID that appears
    /// twice.
    pub fn from_items(items: Vec<CartLineItem>) -> Result<Self, CartStateError> {
        for (i, item) in items.iter().enumerate() {
            if items.iter().skip(i + 1).any(|other| other.id == item.id) {
                return Err(CartStateError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Consumes the cart and returns its line items.
    #[must_use]
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Iterate over line items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartLineItem> {
        self.items.iter()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Whether the cart holds a line for a product.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Insert a product, or bump the quantity of an existing line.
    ///
    /// When the product is already in the cart its title, image and price are
    /// replaced by the candidate's and the quantity grows by one, keeping the
    /// line's position. Otherwise the product is appended with quantity one.
    ///
    /// Returns the resulting quantity.
    pub fn upsert(&mut self, item: NewCartItem) -> NonZeroU32 {
        if let Some(existing) = self.items.iter_mut().find(|line| line.id == item.id) {
            let quantity = existing.quantity.saturating_add(1);
            *existing = CartLineItem::new(item, quantity);
            return quantity;
        }

        self.items.push(CartLineItem::new(item, NonZeroU32::MIN));
        NonZeroU32::MIN
    }

    /// Add one unit to an existing line.
    ///
    /// Returns the new quantity, or `None` if no line matches. A missing ID
    /// never creates a line.
    pub fn increment(&mut self, id: &ProductId) -> Option<NonZeroU32> {
        let line = self.items.iter_mut().find(|line| &line.id == id)?;
        line.quantity = line.quantity.saturating_add(1);
        Some(line.quantity)
    }

    /// Remove one unit from a line.
    ///
    /// A line at quantity one is removed; the remaining lines keep their
    /// order. This is the only way a line leaves the cart.
    pub fn decrement(&mut self, id: &ProductId) -> DecrementOutcome {
        let Some(pos) = self.items.iter().position(|line| &line.id == id) else {
            return DecrementOutcome::Missing;
        };

        let Some(line) = self.items.get_mut(pos) else {
            return DecrementOutcome::Missing;
        };

        match NonZeroU32::new(line.quantity.get() - 1) {
            Some(quantity) => {
                line.quantity = quantity;
                DecrementOutcome::Decremented(quantity)
            }
            None => {
                self.items.remove(pos);
                DecrementOutcome::Removed
            }
        }
    }
}

impl Serialize for CartState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl TryFrom<Vec<CartLineItem>> for CartState {
    type Error = CartStateError;

    fn try_from(items: Vec<CartLineItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<CartState> for Vec<CartLineItem> {
    fn from(state: CartState) -> Self {
        state.items
    }
}

impl<'a> IntoIterator for &'a CartState {
    type Item = &'a CartLineItem;
    type IntoIter = std::slice::Iter<'a, CartLineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
