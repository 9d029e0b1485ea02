//! # Configuration State
//!
//! Application configuration loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SHOPKEEP_*`)
//! 2. Config file (`--config <path>` or `<config dir>/shopkeep.toml`)
//! 3. Defaults (this file)
//!
//! ## Example `shopkeep.toml`
//! ```toml
//! store_name = "Corner Shop"
//! currency_symbol = "₸"
//! currency_code = "KZT"
//! checkout_policy = "compensate"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use shopkeep_core::{RECENT_ORDERS_LIMIT, TOP_PRODUCTS_LIMIT};
use shopkeep_db::CheckoutPolicy;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "shopkeep.toml";
pub const DATABASE_FILE_NAME: &str = "shopkeep.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },

    #[error("Could not determine the application data directory")]
    NoDataDir,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file. `None` means `<data dir>/shopkeep.db`.
    pub database_path: Option<PathBuf>,

    /// Store name shown in headers
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// What a failed step after order creation does
    pub checkout_policy: CheckoutPolicy,

    pub recent_orders_limit: usize,

    pub top_products_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: None,
            store_name: "My Shop".to_string(),
            currency_code: "USD".to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
            checkout_policy: CheckoutPolicy::BestEffort,
            recent_orders_limit: RECENT_ORDERS_LIMIT,
            top_products_limit: TOP_PRODUCTS_LIMIT,
        }
    }
}

impl AppConfig {
    /// Loads file settings then applies environment overrides.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => AppConfig::default(),
            },
        };

        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Applies `SHOPKEEP_*` overrides read through `lookup`.
    ///
    /// ## Environment Variables
    /// - `SHOPKEEP_DB_PATH`: database file
    /// - `SHOPKEEP_STORE_NAME`: store name
    /// - `SHOPKEEP_CURRENCY_SYMBOL`: display symbol
    /// - `SHOPKEEP_CHECKOUT_POLICY`: `best_effort` or `compensate`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("SHOPKEEP_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup("SHOPKEEP_STORE_NAME") {
            self.store_name = name;
        }

        if let Some(symbol) = lookup("SHOPKEEP_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        if let Some(policy) = lookup("SHOPKEEP_CHECKOUT_POLICY") {
            self.checkout_policy = policy.parse().map_err(|e: shopkeep_core::ValidationError| {
                ConfigError::InvalidEnv {
                    var: "SHOPKEEP_CHECKOUT_POLICY",
                    reason: e.to_string(),
                }
            })?;
        }

        Ok(())
    }

    /// Configured database file, or the platform data directory default.
    ///
    /// ## Platform-Specific Defaults
    /// - **macOS**: `~/Library/Application Support/com.shopkeep.shopkeep/shopkeep.db`
    /// - **Windows**: `%APPDATA%\shopkeep\shopkeep\data\shopkeep.db`
    /// - **Linux**: `~/.local/share/shopkeep/shopkeep.db`
    pub fn resolve_database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
        Ok(dirs.data_dir().join(DATABASE_FILE_NAME))
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_currency(1234), "$12.34");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let divisor = 10_i64.pow(u32::from(self.currency_decimals));
        let whole = (cents / divisor).abs();
        let frac = (cents % divisor).abs();
        let sign = if cents < 0 { "-" } else { "" };

        if self.currency_decimals > 0 {
            format!(
                "{sign}{}{whole}.{frac:0width$}",
                self.currency_symbol,
                width = usize::from(self.currency_decimals)
            )
        } else {
            format!("{sign}{}{whole}", self.currency_symbol)
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "shopkeep", "shopkeep")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
