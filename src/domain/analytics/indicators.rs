use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fixed display moving averages, computed for every technical-analysis view.
pub const DISPLAY_SMA_WINDOWS: [usize; 3] = [21, 50, 200];

/// Multiplier applied to the rolling standard deviation for the bands.
pub const BAND_WIDTH_STD: f64 = 2.0;

/// Rolling mean and population standard deviation for one window size,
/// index-aligned with the source series. Positions with fewer than `window`
/// preceding points are `NaN`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingStats {
    pub mean: Vec<f64>,
    pub std_dev: Vec<f64>,
}

/// Rolling statistics for one series, keyed by window size, with
/// Bollinger-style bands derived from the primary window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub symbol: String,
    pub primary_window: usize,
    pub stats: BTreeMap<usize, RollingStats>,
    pub upper_band: Vec<f64>,
    pub lower_band: Vec<f64>,
}

impl IndicatorSet {
    /// Rolling mean series for a window, if it was computed.
    pub fn sma(&self, window: usize) -> Option<&[f64]> {
        self.stats.get(&window).map(|s| s.mean.as_slice())
    }

    /// Rolling standard deviation series for a window, if it was computed.
    pub fn std_dev(&self, window: usize) -> Option<&[f64]> {
        self.stats.get(&window).map(|s| s.std_dev.as_slice())
    }
}
