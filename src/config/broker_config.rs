//! Broker configuration parsing from environment variables.
//!
//! Loads credentials and transport settings for the Binance USD-M futures API.

use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_FUTURES_BASE_URL: &str = "https://fapi.binance.com";

/// Binance USD-M futures API configuration
#[derive(Debug, Clone)]
pub struct BinanceFuturesConfig {
    pub api_key: String,
    pub secret_key: String,
    pub base_url: String,
    pub recv_window_ms: Option<u64>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for BinanceFuturesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            base_url: DEFAULT_FUTURES_BASE_URL.to_string(),
            recv_window_ms: None,
            timeout_secs: 30,
            max_retries: 0,
        }
    }
}

impl BinanceFuturesConfig {
    pub fn from_env() -> Result<Self> {
        let recv_window_ms = match env::var("BINANCE_FUTURES_RECV_WINDOW_MS") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .context("Failed to parse BINANCE_FUTURES_RECV_WINDOW_MS")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            api_key: env::var("BINANCE_FUTURES_API_KEY").unwrap_or_default(),
            secret_key: env::var("BINANCE_FUTURES_SECRET_KEY").unwrap_or_default(),
            base_url: env::var("BINANCE_FUTURES_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_FUTURES_BASE_URL.to_string()),
            recv_window_ms,
            timeout_secs: Self::parse_u64("BINANCE_FUTURES_TIMEOUT_SECS", 30)?,
            max_retries: Self::parse_u32("BINANCE_FUTURES_MAX_RETRIES", 0)?,
        })
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_key.is_empty()
    }

    fn parse_u64(key: &str, default: u64) -> Result<u64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<u64>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_u32(key: &str, default: u32) -> Result<u32> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<u32>()
            .context(format!("Failed to parse {}", key))
    }
}
