//! Persisted cart format.
//!
//! The cart is stored as a single JSON text value:
//!
//! ```json
//! [{"id":"p1","title":"Widget","imageUrl":"http://...","price":9.99,"quantity":2}]
//! ```
//!
//! The bare array is schema version 1 and is what [`encode`] always writes.
//! [`decode`] also reads the versioned envelope
//! `{"version": N, "products": [...]}`, so a later format can be introduced
//! without guessing the shape of old data. Versions newer than
//! [`CURRENT_SCHEMA_VERSION`] are refused rather than misread.

use gomarketplace_core::CartState;
use serde::Deserialize;
use serde::de::Error as _;
use serde_json::Value;

use crate::error::{CartError, Result};

/// Latest persisted schema version this build understands.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Deserialize)]
struct EnvelopeHeader {
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    products: CartState,
}

/// Serialize a cart for storage.
///
/// # Errors
///
/// Returns [`CartError::Serialize`] if encoding fails.
pub fn encode(state: &CartState) -> Result<String> {
    serde_json::to_string(state).map_err(CartError::Serialize)
}

/// Parse a stored cart.
///
/// # Errors
///
/// Returns [`CartError::Corrupt`] if the text is not valid JSON, does not
/// match the cart schema, or lists a product twice. Returns
/// [`CartError::UnsupportedSchemaVersion`] for an envelope with version 0 or
/// a version newer than [`CURRENT_SCHEMA_VERSION`].
pub fn decode(raw: &str) -> Result<CartState> {
    let value: Value = serde_json::from_str(raw).map_err(CartError::Corrupt)?;

    match value {
        Value::Array(_) => CartState::deserialize(&value).map_err(CartError::Corrupt),
        Value::Object(_) => {
            let header = EnvelopeHeader::deserialize(&value).map_err(CartError::Corrupt)?;
            if header.version == 0 || header.version > CURRENT_SCHEMA_VERSION {
                return Err(CartError::UnsupportedSchemaVersion {
                    found: header.version,
                    supported: CURRENT_SCHEMA_VERSION,
                });
            }
            let envelope = Envelope::deserialize(&value).map_err(CartError::Corrupt)?;
            Ok(envelope.products)
        }
        _ => Err(CartError::Corrupt(serde_json::Error::custom(
            "expected a cart array or a versioned cart object",
        ))),
    }
}
