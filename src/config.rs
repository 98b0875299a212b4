use anyhow::Result;
use std::env;
use std::time::Duration;

use crate::application::handlers::ServiceTimeouts;
use crate::domain::analytics::forecast::{ForecastSettings, ScalerFitScope};

/// Instruments tracked when SYMBOLS is not set, in universe order.
pub const DEFAULT_UNIVERSE: [&str; 20] = [
    "ADA-USD", "ATOM-USD", "AVAX-USD", "AXS-USD", "BTC-USD", "DOGE-USD", "DOT-USD", "ETH-USD",
    "FLOW-USD", "HNT-USD", "LINK-USD", "LTC-USD", "LUNA1-USD", "MATIC-USD", "PAXG-USD",
    "QNT-USD", "SHIB-USD", "SOL-USD", "TRX-USD", "XMR-USD",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub symbols: Vec<String>,
    pub binance_base_url: String,
    pub forecast: ForecastSettings,
    pub fetch_timeout_secs: u64,
    pub train_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let symbols = match env::var("SYMBOLS") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            _ => DEFAULT_UNIVERSE.iter().map(|s| s.to_string()).collect(),
        };

        let binance_base_url = env::var("BINANCE_BASE_URL")
            .unwrap_or_else(|_| "https://api.binance.com".to_string());

        let defaults = ForecastSettings::default();
        let scaler_fit_scope = match env::var("SCALER_FIT_SCOPE") {
            Ok(raw) => raw.parse::<ScalerFitScope>()?,
            Err(_) => defaults.scaler_fit_scope,
        };

        let forecast = ForecastSettings {
            min_history: parse_env("FORECAST_MIN_HISTORY", defaults.min_history),
            training_epochs: parse_env("FORECAST_EPOCHS", defaults.training_epochs),
            learning_rate: parse_env("FORECAST_LEARNING_RATE", defaults.learning_rate),
            hidden_units: parse_env("FORECAST_HIDDEN_UNITS", defaults.hidden_units),
            dropout: parse_env("FORECAST_DROPOUT", defaults.dropout),
            future_offset: defaults.future_offset,
            scaler_fit_scope,
        };

        Ok(Self {
            symbols,
            binance_base_url,
            forecast,
            fetch_timeout_secs: parse_env("FETCH_TIMEOUT_SECS", 30),
            train_timeout_secs: parse_env("TRAIN_TIMEOUT_SECS", 180),
        })
    }

    pub fn timeouts(&self) -> ServiceTimeouts {
        ServiceTimeouts {
            fetch: Duration::from_secs(self.fetch_timeout_secs),
            train: Duration::from_secs(self.train_timeout_secs),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
