//! Environment-driven configuration.
//!
//! Values are read once at startup (binaries call `dotenvy::dotenv()` first)
//! and passed down explicitly; nothing below this module reads the
//! environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::core::broker::{BrokerConfig, RetryPolicy};
use crate::indicators::IndicatorCapabilities;
use crate::models::Horizons;

pub const DEFAULT_NARRATION_BASE_URL: &str = "https://api.together.xyz/v1";
pub const DEFAULT_NARRATION_MODEL: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";
pub const DEFAULT_BINANCE_BASE_URL: &str = "https://api.binance.com";
pub const DEFAULT_TRADINGVIEW_SCANNER_URL: &str = "https://scanner.tradingview.com/crypto/scan";

/// Deployment environment name (`production`, `sandbox`, ...).
pub fn get_environment() -> String {
    env::var("APP_ENV")
        .or_else(|_| env::var("ENVIRONMENT"))
        .unwrap_or_else(|_| "sandbox".to_string())
        .to_lowercase()
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[derive(Debug, Clone)]
pub struct NarrationConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Deadline for one narration handle; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub binance_base_url: String,
    pub tradingview_scanner_url: String,
    pub tradingview_exchange: String,
    pub candle_limit: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub port: u16,
    pub default_symbol: String,
    pub horizons: Horizons,
    pub capabilities: IndicatorCapabilities,
    pub broker: BrokerConfig,
    pub retry: RetryPolicy,
    pub narration: NarrationConfig,
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let timeout_secs: u64 = env_or("NARRATION_TIMEOUT_SECONDS", 60);
        let api_key = env::var("NARRATION_API_KEY")
            .or_else(|_| env::var("TOGETHER_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());

        Self {
            environment: get_environment(),
            port: env_or("PORT", 8080),
            default_symbol: env_string("SYMBOL", "BTCUSDT").to_uppercase(),
            horizons: Horizons::default(),
            capabilities: IndicatorCapabilities {
                overlays: env_flag("OVERLAYS_ENABLED", true),
            },
            broker: BrokerConfig {
                min_interval: Duration::from_millis(env_or("NARRATION_INTERVAL_MS", 1000)),
            },
            retry: RetryPolicy {
                max_attempts: env_or("NARRATION_MAX_ATTEMPTS", 3usize).max(1),
                delay: Duration::from_millis(env_or("NARRATION_RETRY_DELAY_MS", 2000)),
            },
            narration: NarrationConfig {
                api_key,
                base_url: env_string("NARRATION_BASE_URL", DEFAULT_NARRATION_BASE_URL),
                model: env_string("NARRATION_MODEL", DEFAULT_NARRATION_MODEL),
                timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            },
            upstream: UpstreamConfig {
                binance_base_url: env_string("BINANCE_BASE_URL", DEFAULT_BINANCE_BASE_URL),
                tradingview_scanner_url: env_string(
                    "TRADINGVIEW_SCANNER_URL",
                    DEFAULT_TRADINGVIEW_SCANNER_URL,
                ),
                tradingview_exchange: env_string("TRADINGVIEW_EXCHANGE", "BINANCE"),
                candle_limit: env_or("CANDLE_LIMIT", 300),
            },
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }
}
