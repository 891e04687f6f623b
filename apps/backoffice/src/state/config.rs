//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`MORTAR_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use mortar_core::{DEFAULT_RECENT_LIMIT, DEFAULT_REORDER_THRESHOLD};

/// Upper bound on rendered decimal places.
const MAX_CURRENCY_DECIMALS: u8 = 18;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConfigState {
    /// Store name (window title, export headers)
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol, printed after the amount
    pub currency_symbol: String,

    /// Number of decimal places for currency (at most 18 are rendered)
    pub currency_decimals: u8,

    /// Threshold given to new products whose form leaves it blank
    pub default_reorder_threshold: i64,

    /// Rows shown by the recent sales/purchases lists
    pub recent_limit: u32,

    /// Directory receiving catalog exports
    #[ts(as = "String")]
    pub export_dir: PathBuf,
}

impl Default for ConfigState {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Store: "Mortar Matériaux"
    /// - Currency: DZD (DA), two decimals
    /// - Reorder threshold: 5 units
    /// - Exports: current directory
    fn default() -> Self {
        ConfigState {
            store_name: "Mortar Matériaux".to_string(),
            currency_code: "DZD".to_string(),
            currency_symbol: "DA".to_string(),
            currency_decimals: 2,
            default_reorder_threshold: DEFAULT_REORDER_THRESHOLD,
            recent_limit: DEFAULT_RECENT_LIMIT,
            export_dir: PathBuf::from("."),
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `MORTAR_STORE_NAME`: Override store name
    /// - `MORTAR_CURRENCY`: Override currency code
    /// - `MORTAR_CURRENCY_SYMBOL`: Override currency symbol
    /// - `MORTAR_REORDER_THRESHOLD`: Default reorder threshold (e.g., "10")
    /// - `MORTAR_RECENT_LIMIT`: Rows in recent lists (e.g., "50")
    /// - `MORTAR_EXPORT_DIR`: Where catalog exports are written
    ///
    /// Unparseable numbers are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ConfigState::default();

        if let Some(store_name) = lookup("MORTAR_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(code) = lookup("MORTAR_CURRENCY") {
            config.currency_code = code;
        }

        if let Some(symbol) = lookup("MORTAR_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(raw) = lookup("MORTAR_REORDER_THRESHOLD") {
            match raw.trim().parse::<i64>() {
                Ok(threshold) if threshold >= 0 => config.default_reorder_threshold = threshold,
                _ => tracing::warn!(value = %raw, "Ignoring invalid MORTAR_REORDER_THRESHOLD"),
            }
        }

        if let Some(raw) = lookup("MORTAR_RECENT_LIMIT") {
            match raw.trim().parse::<u32>() {
                Ok(limit) if limit > 0 => config.recent_limit = limit,
                _ => tracing::warn!(value = %raw, "Ignoring invalid MORTAR_RECENT_LIMIT"),
            }
        }

        if let Some(dir) = lookup("MORTAR_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }

        config
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(125050), "1250.50 DA");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let decimals = self.currency_decimals.min(MAX_CURRENCY_DECIMALS);
        let sign = if cents < 0 { "-" } else { "" };
        let magnitude = cents.unsigned_abs();

        let amount = match 10_u64.checked_pow(u32::from(decimals)) {
            Some(divisor) if decimals > 0 => format!(
                "{}.{:0width$}",
                magnitude / divisor,
                magnitude % divisor,
                width = usize::from(decimals)
            ),
            _ => magnitude.to_string(),
        };

        format!("{}{} {}", sign, amount, self.currency_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_format_currency_positive() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(125050), "1250.50 DA");
        assert_eq!(config.format_currency(100), "1.00 DA");
        assert_eq!(config.format_currency(1), "0.01 DA");
        assert_eq!(config.format_currency(0), "0.00 DA");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(-1234), "-12.34 DA");
    }

    #[test]
    fn test_format_currency_without_decimals() {
        let config = ConfigState {
            currency_decimals: 0,
            ..ConfigState::default()
        };
        assert_eq!(config.format_currency(1500), "1500 DA");
    }

    #[test]
    fn test_format_currency_extremes() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(i64::MIN), "-92233720368547758.08 DA");
        assert_eq!(config.format_currency(i64::MAX), "92233720368547758.07 DA");

        let wide = ConfigState {
            currency_decimals: 30,
            ..ConfigState::default()
        };
        assert_eq!(wide.format_currency(5), "0.000000000000000005 DA");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MORTAR_STORE_NAME", "Quincaillerie du Port"),
            ("MORTAR_CURRENCY_SYMBOL", "DZD"),
            ("MORTAR_REORDER_THRESHOLD", "12"),
            ("MORTAR_RECENT_LIMIT", "abc"),
            ("MORTAR_EXPORT_DIR", "/tmp/exports"),
        ]
        .into_iter()
        .collect();

        let config = ConfigState::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.store_name, "Quincaillerie du Port");
        assert_eq!(config.currency_symbol, "DZD");
        assert_eq!(config.default_reorder_threshold, 12);
        assert_eq!(config.recent_limit, DEFAULT_RECENT_LIMIT);
        assert_eq!(config.export_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(config.currency_code, "DZD");
    }
}
