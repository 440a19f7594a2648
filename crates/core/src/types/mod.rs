//! Core types for GoMarketplace.
//!
//! This module provides type-safe wrappers for cart domain concepts.

pub mod id;
pub mod item;
pub mod price;
pub mod state;

pub use id::ProductId;
pub use item::{CartLineItem, NewCartItem};
pub use price::{Price, PriceError};
pub use state::{CartState, CartStateError, DecrementOutcome};
