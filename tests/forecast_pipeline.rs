//! Forecast pipeline through the service layer, over the mock feed.

use std::sync::Arc;

use coinscope::application::handlers::{AnalyticsService, ForecastRequest, ServiceTimeouts};
use coinscope::domain::analytics::forecast::{ForecastSettings, ScalerFitScope};
use coinscope::domain::errors::AnalyticsError;
use coinscope::infrastructure::mock::{random_walk, MockMarketDataService};

fn fast_settings() -> ForecastSettings {
    ForecastSettings {
        training_epochs: 1,
        hidden_units: 4,
        ..ForecastSettings::default()
    }
}

fn service(feed: MockMarketDataService, settings: ForecastSettings) -> AnalyticsService {
    AnalyticsService::new(
        vec!["BTC-USD".to_string()],
        Arc::new(feed),
        settings,
        ServiceTimeouts::default(),
    )
}

#[tokio::test]
async fn test_forecast_stitches_predictions() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();

    let closes = random_walk(40_000.0, 90, 42);
    let feed = MockMarketDataService::new().with_closes("BTC-USD", &closes);
    let service = service(feed, fast_settings());

    let result = service
        .forecast(ForecastRequest {
            symbol: "BTC-USD".to_string(),
        })
        .await
        .unwrap();

    // 90 observed points plus one appended future step
    assert_eq!(result.points.len(), 91);
    assert_eq!(result.testing_steps, 18);

    // The appended row has no observed close, only a prediction
    let last = result.points.last().unwrap();
    assert!(last.close.is_nan());
    assert!(last.predicted_close.is_finite());

    // Predictions fill exactly the trailing evaluation rows
    let boundary = result.points.len() - result.testing_steps;
    assert!(result.points[boundary - 1].predicted_close.is_nan());
    assert!(result.points[boundary].predicted_close.is_finite());

    // Both near-future estimates are present and distinct horizons
    assert!(result.predicted_tomorrow.is_finite());
    assert!(result.predicted_day_after.is_finite());
}

#[tokio::test]
async fn test_forecast_memoized_within_day() {
    let closes = random_walk(2_000.0, 80, 7);
    let feed = MockMarketDataService::new().with_closes("BTC-USD", &closes);
    let service = service(feed, fast_settings());

    let first = service
        .forecast(ForecastRequest {
            symbol: "BTC-USD".to_string(),
        })
        .await
        .unwrap();
    let second = service
        .forecast(ForecastRequest {
            symbol: "BTC-USD".to_string(),
        })
        .await
        .unwrap();

    // Retraining would almost surely produce different weights; the memo
    // must return the identical artifact.
    assert_eq!(first.predicted_tomorrow, second.predicted_tomorrow);
    assert_eq!(first.predicted_day_after, second.predicted_day_after);
}

#[tokio::test]
async fn test_forecast_insufficient_history() {
    let feed = MockMarketDataService::new().with_closes("BTC-USD", &[100.0; 30]);
    let service = service(feed, fast_settings());

    let err = service
        .forecast(ForecastRequest {
            symbol: "BTC-USD".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalyticsError::InsufficientHistory {
            points: 30,
            required: 60,
            ..
        }
    ));
}

#[tokio::test]
async fn test_forecast_feed_outage() {
    let feed = MockMarketDataService::new().with_failure("BTC-USD");
    let service = service(feed, fast_settings());

    let err = service
        .forecast(ForecastRequest {
            symbol: "BTC-USD".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyticsError::DataUnavailable { .. }));
}

#[tokio::test]
async fn test_forecast_train_only_scaler_scope() {
    let closes = random_walk(500.0, 75, 11);
    let feed = MockMarketDataService::new().with_closes("BTC-USD", &closes);
    let settings = ForecastSettings {
        scaler_fit_scope: ScalerFitScope::TrainOnly,
        ..fast_settings()
    };
    let service = service(feed, settings);

    let result = service
        .forecast(ForecastRequest {
            symbol: "BTC-USD".to_string(),
        })
        .await
        .unwrap();
    assert!(result.predicted_tomorrow.is_finite());
}
