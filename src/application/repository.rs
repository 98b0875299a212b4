//! Cached access to feed datasets.
//!
//! The repository owns every fetched dataset, keyed by
//! `(instrument set, period, interval)`. Month-scale ranges are sliced out
//! of the cached one-year daily dataset instead of being fetched on their
//! own, so repeated range switches never refetch. `refresh` forces a
//! refetch for one key; `invalidate_all` drops the whole cache.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Months, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::errors::AnalyticsError;
use crate::domain::market::range::{DataSource, Interval, Period, RangeCode};
use crate::domain::market::types::TimeSeries;
use crate::domain::ports::MarketDataService;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DatasetKey {
    symbols: Vec<String>,
    period: Period,
    interval: Interval,
}

/// One fetched batch of per-instrument series.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub series: HashMap<String, TimeSeries>,
    pub fetched_at_ms: i64,
}

pub struct SeriesRepository {
    feed: Arc<dyn MarketDataService>,
    cache: RwLock<HashMap<DatasetKey, Arc<Dataset>>>,
}

impl SeriesRepository {
    pub fn new(feed: Arc<dyn MarketDataService>) -> Self {
        Self {
            feed,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The dataset backing a range, fetched on first use and served from
    /// cache afterwards. A symbol whose fetch fails is dropped from the
    /// dataset with a warning; it never fails the batch.
    pub async fn dataset_for_range(
        &self,
        symbols: &[String],
        range: RangeCode,
    ) -> Result<Arc<Dataset>, AnalyticsError> {
        match range.source() {
            DataSource::Fetch { period, interval } => {
                self.dataset(symbols, period, interval).await
            }
            DataSource::SliceOfYear { months } => {
                let year = self
                    .dataset(symbols, Period::Years(1), Interval::OneDay)
                    .await?;
                Ok(Arc::new(slice_months(&year, months)))
            }
        }
    }

    /// A single instrument's series for a range.
    pub async fn series(
        &self,
        symbol: &str,
        range: RangeCode,
    ) -> Result<TimeSeries, AnalyticsError> {
        let symbols = vec![symbol.to_string()];
        let dataset = self.dataset_for_range(&symbols, range).await?;

        match dataset.series.get(symbol) {
            Some(series) if !series.is_empty() => Ok(series.clone()),
            _ => Err(AnalyticsError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "feed returned no candles".to_string(),
            }),
        }
    }

    /// Forces a refetch for one key on next access.
    pub async fn refresh(&self, symbols: &[String], range: RangeCode) {
        let (period, interval) = match range.source() {
            DataSource::Fetch { period, interval } => (period, interval),
            DataSource::SliceOfYear { .. } => (Period::Years(1), Interval::OneDay),
        };
        let key = DatasetKey {
            symbols: symbols.to_vec(),
            period,
            interval,
        };
        self.cache.write().await.remove(&key);
    }

    /// Drops every cached dataset.
    pub async fn invalidate_all(&self) {
        self.cache.write().await.clear();
    }

    async fn dataset(
        &self,
        symbols: &[String],
        period: Period,
        interval: Interval,
    ) -> Result<Arc<Dataset>, AnalyticsError> {
        let key = DatasetKey {
            symbols: symbols.to_vec(),
            period,
            interval,
        };

        if let Some(dataset) = self.cache.read().await.get(&key) {
            return Ok(dataset.clone());
        }

        let mut series = HashMap::new();
        for symbol in symbols {
            match self.feed.fetch_series(symbol, period, interval).await {
                Ok(s) if !s.is_empty() => {
                    series.insert(symbol.clone(), s);
                }
                Ok(_) => warn!("SeriesRepository: empty series for {}, dropping", symbol),
                Err(e) => warn!("SeriesRepository: fetch failed for {}: {}", symbol, e),
            }
        }

        if series.is_empty() {
            return Err(AnalyticsError::DataUnavailable {
                symbol: symbols.join(","),
                reason: "no instrument in the batch produced data".to_string(),
            });
        }

        info!(
            "SeriesRepository: cached {} series for {:?} {:?}",
            series.len(),
            period,
            interval
        );

        let dataset = Arc::new(Dataset {
            series,
            fetched_at_ms: Utc::now().timestamp_millis(),
        });
        self.cache
            .write()
            .await
            .insert(key, dataset.clone());
        Ok(dataset)
    }
}

fn slice_months(dataset: &Dataset, months: u32) -> Dataset {
    let cutoff_ms = Utc::now()
        .checked_sub_months(Months::new(months))
        .map(|t| t.timestamp_millis())
        .unwrap_or(0);

    Dataset {
        series: dataset
            .series
            .iter()
            .map(|(symbol, series)| (symbol.clone(), series.since(cutoff_ms)))
            .collect(),
        fetched_at_ms: dataset.fetched_at_ms,
    }
}
