//! Type-safe unit price using decimal arithmetic.
//!
//! The cart never does arithmetic on prices, it only carries them through.
//! Prices are still held as [`Decimal`] so that values parsed from user input
//! or storage keep their exact digits, and serialized as JSON numbers to match
//! the persisted cart format.
//!
//! The range is that of [`Decimal`]: at most 28 significant digits and a
//! magnitude below about 7.9e28. Longer fractions are rounded when parsed;
//! larger stored numbers are rejected.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::de::value::MapAccessDeserializer;
use serde::de::{self, IntoDeserializer, MapAccess, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The input is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// Unit price of a product, in the store's currency.
///
/// ## Examples
///
/// ```
/// use gomarketplace_core::Price;
///
/// let price: Price = "9.99".parse().unwrap();
/// assert_eq!(price, Price::from_cents(999));
/// assert_eq!(price.to_string(), "9.99");
///
/// assert!("-1".parse::<Price>().is_err());
/// assert!("free".parse::<Price>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents (two decimal places).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }
}

// Written as a JSON number carrying every digit of the decimal (`9.99`,
// `0.1234567890123456789`), so a stored price reads back unchanged.
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::arbitrary_precision::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl<'de> Visitor<'de> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number within the range of a 96-bit decimal")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        Ok(Price(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        Ok(Price(Decimal::from(v)))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Price, E> {
        Decimal::try_from_i128_with_scale(v, 0)
            .map(Price)
            .map_err(|_| E::invalid_value(Unexpected::Other("128-bit integer"), &self))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Price, E> {
        i128::try_from(v)
            .ok()
            .and_then(|v| Decimal::try_from_i128_with_scale(v, 0).ok())
            .map(Price)
            .ok_or_else(|| E::invalid_value(Unexpected::Other("128-bit integer"), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        exact(IntoDeserializer::<'_, E>::into_deserializer(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        exact(IntoDeserializer::<'_, E>::into_deserializer(v))
    }

    // serde_json hands numbers that do not fit a primitive over as a map.
    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Price, A::Error> {
        exact(MapAccessDeserializer::new(map))
    }
}

fn exact<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Price, D::Error> {
    rust_decimal::serde::arbitrary_precision::deserialize(deserializer).map(Price)
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
