//! Request handlers for the presentation layer.
//!
//! Each handler takes an explicit request struct and returns one of the
//! structured output artifacts; rendering and event dispatch stay with the
//! caller. Handlers own the timeout and concurrency policy: fetches and
//! training run under `tokio::time::timeout`, training itself on a blocking
//! worker, and independent engines run concurrently in the dashboard
//! handler.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::info;

use crate::application::forecast::ForecastEngine;
use crate::application::indicators::compute_rolling_stats;
use crate::application::ranking::compute_leaderboard;
use crate::application::repository::SeriesRepository;
use crate::domain::analytics::forecast::{ForecastResult, ForecastSettings};
use crate::domain::analytics::indicators::IndicatorSet;
use crate::domain::analytics::leaderboard::Leaderboard;
use crate::domain::errors::AnalyticsError;
use crate::domain::market::range::RangeCode;
use crate::domain::market::types::TimeSeries;
use crate::domain::ports::MarketDataService;

#[derive(Debug, Clone)]
pub struct ServiceTimeouts {
    pub fetch: Duration,
    pub train: Duration,
}

impl Default for ServiceTimeouts {
    fn default() -> Self {
        Self {
            fetch: Duration::from_secs(30),
            train: Duration::from_secs(180),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeaderboardRequest {
    pub range: RangeCode,
}

#[derive(Debug, Clone)]
pub struct LeaderboardResponse {
    pub range: RangeCode,
    pub leaderboard: Leaderboard,
}

#[derive(Debug, Clone)]
pub struct TechnicalAnalysisRequest {
    pub symbol: String,
    pub range: RangeCode,
}

#[derive(Debug, Clone)]
pub struct TechnicalAnalysisResponse {
    pub series: TimeSeries,
    pub indicators: IndicatorSet,
}

#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub symbol: String,
}

#[derive(Debug, Clone)]
pub struct SpotPriceRequest {
    pub symbol: String,
}

#[derive(Debug, Clone)]
pub struct SpotPriceQuote {
    pub symbol: String,
    /// Current price, rounded to three decimal places.
    pub price: Decimal,
}

/// Everything the dashboard view needs, produced in one call.
pub struct DashboardResponse {
    pub leaderboard: Result<LeaderboardResponse, AnalyticsError>,
    pub technical_analysis: Result<TechnicalAnalysisResponse, AnalyticsError>,
    pub spot_price: Result<SpotPriceQuote, AnalyticsError>,
    pub forecast: Result<ForecastResult, AnalyticsError>,
}

pub struct AnalyticsService {
    universe: Vec<String>,
    repository: Arc<SeriesRepository>,
    feed: Arc<dyn MarketDataService>,
    forecast_settings: ForecastSettings,
    timeouts: ServiceTimeouts,
    // Trained forecasts are reused within a day per instrument
    forecast_memo: RwLock<HashMap<(String, NaiveDate), ForecastResult>>,
}

impl AnalyticsService {
    pub fn new(
        universe: Vec<String>,
        feed: Arc<dyn MarketDataService>,
        forecast_settings: ForecastSettings,
        timeouts: ServiceTimeouts,
    ) -> Self {
        Self {
            universe,
            repository: Arc::new(SeriesRepository::new(feed.clone())),
            feed,
            forecast_settings,
            timeouts,
            forecast_memo: RwLock::new(HashMap::new()),
        }
    }

    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    pub fn repository(&self) -> &SeriesRepository {
        &self.repository
    }

    pub async fn leaderboard(
        &self,
        request: LeaderboardRequest,
    ) -> Result<LeaderboardResponse, AnalyticsError> {
        let dataset = self
            .with_fetch_timeout(
                "leaderboard dataset fetch",
                self.repository
                    .dataset_for_range(&self.universe, request.range),
            )
            .await?;

        let leaderboard = compute_leaderboard(&self.universe, &dataset.series);
        info!(
            "AnalyticsService: leaderboard for {} ranked {}/{} instruments",
            request.range,
            leaderboard.len(),
            self.universe.len()
        );

        Ok(LeaderboardResponse {
            range: request.range,
            leaderboard,
        })
    }

    pub async fn technical_analysis(
        &self,
        request: TechnicalAnalysisRequest,
    ) -> Result<TechnicalAnalysisResponse, AnalyticsError> {
        let series = self
            .with_fetch_timeout(
                "series fetch",
                self.repository.series(&request.symbol, request.range),
            )
            .await?;

        let indicators = compute_rolling_stats(&series, request.range.boll_window());
        Ok(TechnicalAnalysisResponse { series, indicators })
    }

    pub async fn spot_price(
        &self,
        request: SpotPriceRequest,
    ) -> Result<SpotPriceQuote, AnalyticsError> {
        let fetch = self.feed.fetch_spot_price(&request.symbol);
        let price = tokio::time::timeout(self.timeouts.fetch, fetch)
            .await
            .map_err(|_| AnalyticsError::Timeout {
                operation: "spot price fetch".to_string(),
                timeout_secs: self.timeouts.fetch.as_secs(),
            })?
            .map_err(|e| AnalyticsError::DataUnavailable {
                symbol: request.symbol.clone(),
                reason: e.to_string(),
            })?;

        Ok(SpotPriceQuote {
            symbol: request.symbol,
            price: price.round_dp(3),
        })
    }

    /// Trains a fresh model over one year of daily history and stitches the
    /// predictions. Results are memoized per `(instrument, day)` so a range
    /// or view switch does not retrain.
    pub async fn forecast(
        &self,
        request: ForecastRequest,
    ) -> Result<ForecastResult, AnalyticsError> {
        let memo_key = (request.symbol.clone(), Utc::now().date_naive());
        if let Some(hit) = self.forecast_memo.read().await.get(&memo_key) {
            info!("AnalyticsService: forecast memo hit for {}", request.symbol);
            return Ok(hit.clone());
        }

        let series = self
            .with_fetch_timeout(
                "forecast history fetch",
                self.repository.series(&request.symbol, RangeCode::OneYear),
            )
            .await?;

        let engine = ForecastEngine::new(self.forecast_settings);
        let train = tokio::task::spawn_blocking(move || engine.forecast(&series));
        let result = tokio::time::timeout(self.timeouts.train, train)
            .await
            .map_err(|_| AnalyticsError::Timeout {
                operation: "forecast training".to_string(),
                timeout_secs: self.timeouts.train.as_secs(),
            })?
            .map_err(|e| AnalyticsError::TrainingFailed {
                symbol: request.symbol.clone(),
                reason: format!("training task aborted: {}", e),
            })??;

        self.forecast_memo
            .write()
            .await
            .insert(memo_key, result.clone());
        Ok(result)
    }

    /// Runs the independent engines concurrently; each slot carries its own
    /// result so one failing engine never hides the others.
    pub async fn dashboard(
        &self,
        range: RangeCode,
        symbol: &str,
    ) -> DashboardResponse {
        let (leaderboard, technical_analysis, spot_price, forecast) = tokio::join!(
            self.leaderboard(LeaderboardRequest { range }),
            self.technical_analysis(TechnicalAnalysisRequest {
                symbol: symbol.to_string(),
                range,
            }),
            self.spot_price(SpotPriceRequest {
                symbol: symbol.to_string(),
            }),
            self.forecast(ForecastRequest {
                symbol: symbol.to_string(),
            }),
        );

        DashboardResponse {
            leaderboard,
            technical_analysis,
            spot_price,
            forecast,
        }
    }

    async fn with_fetch_timeout<T>(
        &self,
        operation: &str,
        fut: impl std::future::Future<Output = Result<T, AnalyticsError>>,
    ) -> Result<T, AnalyticsError> {
        tokio::time::timeout(self.timeouts.fetch, fut)
            .await
            .map_err(|_| AnalyticsError::Timeout {
                operation: operation.to_string(),
                timeout_secs: self.timeouts.fetch.as_secs(),
            })?
    }
}
