use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::market::range::{Interval, Period};
use crate::domain::market::types::TimeSeries;

// Need async_trait for async functions in traits
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Fetch the OHLCV history for one instrument over a trailing period.
    async fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<TimeSeries>;

    /// Fetch the current spot price for one instrument.
    async fn fetch_spot_price(&self, symbol: &str) -> Result<Decimal>;
}
