//! Short-horizon price forecasting.
//!
//! A linear six-stage pipeline: collect daily closes, min-max scale, build
//! sliding-window examples, train a stacked-LSTM regressor, infer over the
//! held-out windows, then rescale and stitch the predictions onto an
//! extended date axis.

pub mod dataset;
pub mod model;
pub mod scaler;

use tracing::{debug, info};

use crate::domain::analytics::forecast::{
    ForecastPoint, ForecastResult, ForecastSettings, ScalerFitScope,
};
use crate::domain::errors::AnalyticsError;
use crate::domain::market::types::TimeSeries;

use dataset::{build_dataset, WindowPlan};
use model::SequenceModel;
use scaler::MinMaxScaler;

pub struct ForecastEngine {
    settings: ForecastSettings,
}

impl ForecastEngine {
    pub fn new(settings: ForecastSettings) -> Self {
        Self { settings }
    }

    /// Runs the full pipeline over one year of daily history. Blocking and
    /// CPU-bound; callers that need a suspension point run it under
    /// `spawn_blocking`.
    pub fn forecast(&self, series: &TimeSeries) -> Result<ForecastResult, AnalyticsError> {
        let symbol = series.symbol.as_str();
        let settings = &self.settings;

        // Collect: usable daily closes with their timestamps. Non-finite
        // closes are dropped so the scaler statistics stay defined.
        let observed: Vec<(i64, f64)> = series
            .candles
            .iter()
            .filter(|c| c.close.is_finite())
            .map(|c| (c.timestamp_ms, c.close))
            .collect();

        let n = observed.len();
        if n < settings.min_history {
            return Err(AnalyticsError::InsufficientHistory {
                symbol: symbol.to_string(),
                points: n,
                required: settings.min_history,
            });
        }

        let closes: Vec<f64> = observed.iter().map(|&(_, c)| c).collect();

        // Scale
        let plan = WindowPlan::for_len(n, settings.future_offset);
        let fit_slice = match settings.scaler_fit_scope {
            ScalerFitScope::FullHistory => &closes[..],
            ScalerFitScope::TrainOnly => &closes[..n - plan.testing_steps],
        };
        let scaler = MinMaxScaler::fit(fit_slice);
        let scaled = scaler.transform_all(&closes);

        // Window
        let ds = build_dataset(symbol, &scaled, &plan)?;
        debug!(
            "ForecastEngine: {} -> {} train examples, window {}, {} held out",
            symbol,
            ds.train_inputs.len(),
            plan.window_size,
            plan.testing_steps
        );

        // Train
        let training_failed = |reason: String| AnalyticsError::TrainingFailed {
            symbol: symbol.to_string(),
            reason,
        };

        let model = SequenceModel::new(settings.hidden_units, settings.dropout)
            .map_err(|e| training_failed(e.to_string()))?;
        let history = model
            .fit(
                &ds.train_inputs,
                &ds.train_targets,
                settings.training_epochs,
                settings.learning_rate,
            )
            .map_err(|e| training_failed(e.to_string()))?;
        if let Some(final_loss) = history.last() {
            info!(
                "ForecastEngine: trained {} for {} epochs, final loss {:.6}",
                symbol,
                history.len(),
                final_loss
            );
        }

        // Infer
        let predicted_scaled = model
            .predict(&ds.infer_windows)
            .map_err(|e| training_failed(e.to_string()))?;

        // Two distinct horizons: the last inference window ends at the
        // penultimate close and targets one step past the series; the
        // window ending at the final close targets one step further out.
        let tomorrow_scaled = *predicted_scaled
            .last()
            .ok_or_else(|| training_failed("inference produced no values".to_string()))?;
        let day_after_window = scaled[n - plan.window_size..].to_vec();
        let day_after_scaled = model
            .predict(&[day_after_window])
            .map_err(|e| training_failed(e.to_string()))?[0];

        // Rescale & stitch
        let predicted: Vec<f64> = predicted_scaled.iter().map(|&v| scaler.inverse(v)).collect();
        let step_ms = series.interval.step_ms();
        let last_ts = observed[n - 1].0;

        let mut points: Vec<ForecastPoint> = observed
            .iter()
            .map(|&(ts, close)| ForecastPoint {
                timestamp_ms: ts,
                close,
                predicted_close: f64::NAN,
            })
            .collect();
        for k in 1..=settings.future_offset {
            points.push(ForecastPoint {
                timestamp_ms: last_ts + k as i64 * step_ms,
                close: f64::NAN,
                predicted_close: f64::NAN,
            });
        }

        let total = points.len();
        for (j, &value) in predicted.iter().enumerate() {
            points[total - plan.testing_steps + j].predicted_close = value;
        }

        Ok(ForecastResult {
            symbol: symbol.to_string(),
            points,
            window_size: plan.window_size,
            testing_steps: plan.testing_steps,
            predicted_tomorrow: round4(scaler.inverse(tomorrow_scaled)),
            predicted_day_after: round4(scaler.inverse(day_after_scaled)),
        })
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
