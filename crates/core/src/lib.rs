//! GoMarketplace Core - Shared cart types.
//!
//! This crate provides the types used across all GoMarketplace components:
//! - `cart` - Persistent cart store and storage backends
//! - `cli` - Command-line tool for inspecting and editing a cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no storage access, no async runtime. Persistence lives in the `cart` crate.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, cart line items and the cart state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
