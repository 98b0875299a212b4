//! Deterministic in-memory feed for tests and demos.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::domain::market::range::{Interval, Period};
use crate::domain::market::types::{Candle, TimeSeries};
use crate::domain::ports::MarketDataService;

#[derive(Default)]
pub struct MockMarketDataService {
    series: HashMap<String, Vec<Candle>>,
    spot_prices: HashMap<String, Decimal>,
    failing: HashSet<String>,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_closes(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.series.insert(symbol.to_string(), candles(closes));
        self
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.series.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_spot_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.spot_prices.insert(symbol.to_string(), price);
        self
    }

    /// Every fetch for this symbol fails, simulating a feed outage.
    pub fn with_failure(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }
}

/// Daily candles carrying the given closes.
pub fn candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp_ms: 1_700_000_000_000 + i as i64 * 86_400_000,
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000.0,
        })
        .collect()
}

/// A seeded random walk, for demo data that looks like a price series.
pub fn random_walk(start: f64, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut closes = Vec::with_capacity(n);
    let mut price = start;
    for _ in 0..n {
        price *= 1.0 + rng.gen_range(-0.03..0.03);
        closes.push(price);
    }
    closes
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn fetch_series(
        &self,
        symbol: &str,
        _period: Period,
        interval: Interval,
    ) -> Result<TimeSeries> {
        if self.failing.contains(symbol) {
            anyhow::bail!("simulated feed outage for {}", symbol);
        }

        let candles = self.series.get(symbol).cloned().unwrap_or_default();
        Ok(TimeSeries::new(symbol, interval, candles))
    }

    async fn fetch_spot_price(&self, symbol: &str) -> Result<Decimal> {
        if self.failing.contains(symbol) {
            anyhow::bail!("simulated feed outage for {}", symbol);
        }

        self.spot_prices
            .get(symbol)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no spot price loaded for {}", symbol))
    }
}
