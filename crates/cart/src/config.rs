//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORE_PATH` - JSON file backing the file store (default: `.gomarketplace/cart.json`)
//! - `CART_STORAGE_KEY` - Storage key holding the cart (default: `cart:products`)

use std::path::PathBuf;

use thiserror::Error;

use crate::store::DEFAULT_CART_KEY;

const DEFAULT_STORE_PATH: &str = ".gomarketplace/cart.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Path of the JSON file used by the file store
    pub store_path: PathBuf,
    /// Storage key the cart is persisted under
    pub storage_key: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            storage_key: DEFAULT_CART_KEY.to_string(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store_path = PathBuf::from(get_or_default(
            &lookup,
            "CART_STORE_PATH",
            DEFAULT_STORE_PATH,
        ));

        let storage_key = get_or_default(&lookup, "CART_STORAGE_KEY", DEFAULT_CART_KEY);

        let config = Self {
            store_path,
            storage_key,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values that may have been overridden after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` naming `CART_STORAGE_KEY` if the
    /// storage key is empty or only whitespace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}
