//! Cart line items.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// One distinct product in the cart, with its quantity.
///
/// `title`, `image_url` and `price` are display data owned by the catalog; the
/// cart carries them through unchanged. The quantity is a [`NonZeroU32`], so a
/// line item with quantity zero cannot exist. Persisted data claiming
/// `"quantity": 0` is rejected on deserialization.
///
/// Serialized with camelCase keys (`imageUrl`). The snake_case `image_url` key
/// written by older clients is accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product identifier, unique within a cart.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Display image reference.
    #[serde(alias = "image_url")]
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    /// Number of units, always at least one.
    pub quantity: NonZeroU32,
}

impl CartLineItem {
    /// Build a line item from a candidate and a quantity.
    #[must_use]
    pub fn new(item: NewCartItem, quantity: NonZeroU32) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity,
        }
    }

    /// Returns the product metadata of this line, without the quantity.
    #[must_use]
    pub fn to_new_item(&self) -> NewCartItem {
        NewCartItem {
            id: self.id.clone(),
            title: self.title.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
        }
    }
}

/// A product about to be added to the cart: a line item without quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Display image reference.
    #[serde(alias = "image_url")]
    pub image_url: String,
    /// Unit price.
    pub price: Price,
}

impl NewCartItem {
    /// Create a new cart candidate.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}
