//! Configuration module for the futures client.
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honoured by the binary through `dotenvy`).

mod broker_config;

pub use broker_config::{BinanceFuturesConfig, DEFAULT_FUTURES_BASE_URL};

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub binance: BinanceFuturesConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let binance =
            BinanceFuturesConfig::from_env().context("Failed to load Binance futures config")?;

        Ok(Self { binance })
    }
}
