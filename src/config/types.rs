use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and under which keys the storefront persists its state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one file per key (default: `<data dir>/fluxstore`).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Key of the persisted cart branch.
    #[serde(default = "default_cart_key")]
    pub cart_key: String,
    /// Key of the persisted promise branch.
    #[serde(default = "default_promise_key")]
    pub promise_key: String,
    /// Key of the raw session token.
    #[serde(default = "default_token_key")]
    pub token_key: String,
    /// Key of the order history.
    #[serde(default = "default_orders_key")]
    pub orders_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (default: "warn").
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_cart_key() -> String {
    "cart".to_string()
}

fn default_promise_key() -> String {
    "promise".to_string()
}

fn default_token_key() -> String {
    "authToken".to_string()
}

fn default_orders_key() -> String {
    "orders".to_string()
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            cart_key: default_cart_key(),
            promise_key: default_promise_key(),
            token_key: default_token_key(),
            orders_key: default_orders_key(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl StorageConfig {
    /// Resolved storage directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("fluxstore")
        })
    }

    pub(crate) fn keys(&self) -> [(&'static str, &str); 4] {
        [
            ("cart_key", self.cart_key.as_str()),
            ("promise_key", self.promise_key.as_str()),
            ("token_key", self.token_key.as_str()),
            ("orders_key", self.orders_key.as_str()),
        ]
    }
}
