//! Rolling statistics over a single instrument's series.
//!
//! All outputs are index-aligned with the input: position `i` describes the
//! window ending at `i`, and positions with fewer than `window` preceding
//! points are `NaN`. A `NaN` close inside a window yields `NaN` for that
//! position rather than an error.

use std::collections::BTreeMap;

use crate::domain::analytics::indicators::{
    IndicatorSet, RollingStats, BAND_WIDTH_STD, DISPLAY_SMA_WINDOWS,
};
use crate::domain::market::types::TimeSeries;

/// Simple moving average over a trailing window.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        out[i] = slice.iter().sum::<f64>() / window as f64;
    }
    out
}

/// Rolling population standard deviation (divides by `window`, not
/// `window - 1`).
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window as f64;
        out[i] = variance.sqrt();
    }
    out
}

/// Computes rolling means and standard deviations for the primary window and
/// the fixed display windows, plus `mean ± 2·std` bands for the primary
/// window. The input series is not modified.
pub fn compute_rolling_stats(series: &TimeSeries, primary_window: usize) -> IndicatorSet {
    let closes = series.closes();

    let mut stats = BTreeMap::new();
    for window in DISPLAY_SMA_WINDOWS
        .iter()
        .copied()
        .chain(std::iter::once(primary_window))
    {
        stats.entry(window).or_insert_with(|| RollingStats {
            mean: rolling_mean(&closes, window),
            std_dev: rolling_std(&closes, window),
        });
    }

    let primary = &stats[&primary_window];
    let upper_band: Vec<f64> = primary
        .mean
        .iter()
        .zip(primary.std_dev.iter())
        .map(|(m, s)| m + BAND_WIDTH_STD * s)
        .collect();
    let lower_band: Vec<f64> = primary
        .mean
        .iter()
        .zip(primary.std_dev.iter())
        .map(|(m, s)| m - BAND_WIDTH_STD * s)
        .collect();

    IndicatorSet {
        symbol: series.symbol.clone(),
        primary_window,
        stats,
        upper_band,
        lower_band,
    }
}
