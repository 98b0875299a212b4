use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which part of the history the min-max scaler is fit on.
///
/// The observed source behavior fits on the full series (train and test
/// alike); `TrainOnly` removes that leakage at the cost of diverging from
/// the reference output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalerFitScope {
    FullHistory,
    TrainOnly,
}

impl FromStr for ScalerFitScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "full_history" => Ok(ScalerFitScope::FullHistory),
            "train" | "train_only" => Ok(ScalerFitScope::TrainOnly),
            _ => anyhow::bail!(
                "Invalid SCALER_FIT_SCOPE: {}. Must be 'full' or 'train'",
                s
            ),
        }
    }
}

/// Hyperparameters of the forecasting pipeline. All of them are surfaced
/// through `Config::from_env`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSettings {
    /// Minimum number of usable daily closes before a forecast is attempted.
    pub min_history: usize,
    /// Full passes over the training examples.
    pub training_epochs: usize,
    pub learning_rate: f64,
    /// Units per recurrent layer.
    pub hidden_units: usize,
    /// Dropout rate between recurrent layers.
    pub dropout: f32,
    /// Steps past the last known close that the model targets.
    pub future_offset: usize,
    pub scaler_fit_scope: ScalerFitScope,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            min_history: 60,
            training_epochs: 10,
            learning_rate: 1e-3,
            hidden_units: 50,
            dropout: 0.2,
            future_offset: 1,
            scaler_fit_scope: ScalerFitScope::FullHistory,
        }
    }
}

/// One row of the stitched forecast output. `close` is `NaN` on appended
/// future rows; `predicted_close` is `NaN` outside the trailing evaluation
/// window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp_ms: i64,
    pub close: f64,
    pub predicted_close: f64,
}

/// The original daily series extended past its last known date, with model
/// predictions aligned to the trailing rows, plus two near-future scalar
/// estimates covering distinct horizons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub symbol: String,
    pub points: Vec<ForecastPoint>,
    pub window_size: usize,
    pub testing_steps: usize,
    /// Predicted close one step past the last known date.
    pub predicted_tomorrow: f64,
    /// Predicted close two steps out, from the window ending at the final
    /// known close.
    pub predicted_day_after: f64,
}
