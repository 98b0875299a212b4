//! Binance market data adapter.
//!
//! Serves both feed roles: historical candles from the public klines
//! endpoint and current prices from the ticker endpoint. Failures are
//! surfaced to the caller as-is; there is no automatic retry.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Months, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use crate::domain::market::range::{Interval, Period};
use crate::domain::market::types::{to_exchange_symbol, to_spot_symbol, Candle, TimeSeries};
use crate::domain::ports::MarketDataService;

const KLINES_PAGE_LIMIT: usize = 1000;

pub struct BinanceMarketDataService {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceMarketDataService {
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    async fn fetch_klines_page(
        &self,
        api_symbol: &str,
        interval: Interval,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<Candle>> {
        let url = format!("{}/api/v3/klines", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", api_symbol),
                ("interval", interval.exchange_code()),
                ("startTime", &start_ms.to_string()),
                ("endTime", &end_ms.to_string()),
                ("limit", &KLINES_PAGE_LIMIT.to_string()),
            ])
            .send()
            .await
            .context("Failed to fetch klines from Binance")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Binance klines fetch failed: {}", error_text);
        }

        // Binance klines format: [timestamp, open, high, low, close, volume, ...]
        let klines: Vec<serde_json::Value> = response
            .json()
            .await
            .context("Failed to parse Binance klines response")?;

        let candles: Vec<Candle> = klines
            .into_iter()
            .filter_map(|k| {
                let arr = k.as_array()?;
                if arr.len() < 6 {
                    return None;
                }

                let timestamp_ms = arr[0].as_i64()?;
                let open = arr[1].as_str()?.parse::<f64>().ok()?;
                let high = arr[2].as_str()?.parse::<f64>().ok()?;
                let low = arr[3].as_str()?.parse::<f64>().ok()?;
                let close = arr[4].as_str()?.parse::<f64>().ok()?;
                let volume = arr[5].as_str()?.parse::<f64>().ok()?;

                Some(Candle {
                    timestamp_ms,
                    open,
                    high,
                    low,
                    close,
                    volume,
                })
            })
            .collect();

        Ok(candles)
    }
}

fn period_start_ms(period: Period) -> i64 {
    let now = Utc::now();
    match period {
        Period::Hours(h) => (now - ChronoDuration::hours(h as i64)).timestamp_millis(),
        Period::Days(d) => (now - ChronoDuration::days(d as i64)).timestamp_millis(),
        Period::Years(y) => now
            .checked_sub_months(Months::new(12 * y))
            .map(|t| t.timestamp_millis())
            .unwrap_or(0),
        Period::Max => 0,
    }
}

#[async_trait]
impl MarketDataService for BinanceMarketDataService {
    async fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<TimeSeries> {
        let api_symbol = to_exchange_symbol(symbol);
        let end_ms = Utc::now().timestamp_millis();
        let start_ms = period_start_ms(period);

        let mut candles: Vec<Candle> = Vec::new();
        let mut cursor = start_ms;
        loop {
            let page = self
                .fetch_klines_page(&api_symbol, interval, cursor, end_ms)
                .await?;
            let page_len = page.len();
            candles.extend(page);

            // Anything but a full page means the feed is exhausted
            if page_len < KLINES_PAGE_LIMIT {
                break;
            }
            match candles.last() {
                Some(last) => cursor = last.timestamp_ms + interval.step_ms(),
                None => break,
            }
        }

        info!(
            "BinanceMarketDataService: fetched {} bars for {} ({:?} {:?})",
            candles.len(),
            symbol,
            period,
            interval
        );

        Ok(TimeSeries::new(symbol, interval, candles))
    }

    async fn fetch_spot_price(&self, symbol: &str) -> Result<Decimal> {
        let api_symbol = to_spot_symbol(symbol);
        let url = format!("{}/api/v3/ticker/price", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", api_symbol.as_str())])
            .send()
            .await
            .context("Failed to fetch spot price from Binance")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Binance ticker API error: {}", error_text);
        }

        #[derive(Debug, Deserialize)]
        struct PriceTicker {
            #[allow(dead_code)]
            symbol: String,
            price: String,
        }

        let ticker: PriceTicker = response
            .json()
            .await
            .context("Failed to parse Binance ticker response")?;

        Decimal::from_str_exact(&ticker.price)
            .with_context(|| format!("Unparseable ticker price: {}", ticker.price))
    }
}
