use serde::{Deserialize, Serialize};

use super::range::Interval;

/// A single OHLCV bar.
///
/// Prices are `f64` so that a missing value can be carried as `NaN` and
/// propagate through the rolling computations instead of aborting them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// An ordered price history for one instrument at one sampling interval.
///
/// Timestamps are strictly increasing. A series is immutable once produced
/// by the data feed; every engine works on a borrowed view and returns a
/// fresh value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    pub symbol: String,
    pub interval: Interval,
    pub candles: Vec<Candle>,
}

impl TimeSeries {
    pub fn new(symbol: impl Into<String>, interval: Interval, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            candles,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn first_close(&self) -> Option<f64> {
        self.candles.first().map(|c| c.close)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    /// A copy restricted to candles at or after `cutoff_ms`.
    pub fn since(&self, cutoff_ms: i64) -> TimeSeries {
        TimeSeries {
            symbol: self.symbol.clone(),
            interval: self.interval,
            candles: self
                .candles
                .iter()
                .filter(|c| c.timestamp_ms >= cutoff_ms)
                .copied()
                .collect(),
        }
    }
}

// ===== Symbol Translation =====

/// Translates a dash-separated instrument symbol ("BTC-USD") to the exchange
/// order-book convention ("BTCUSDT"). The USD quote trades against the USDT
/// book on the exchange side.
pub fn to_exchange_symbol(symbol: &str) -> String {
    let mut s = symbol.replace('-', "");
    s.push('T');
    s
}

/// Translates an instrument symbol to the spot-price service convention.
///
/// One symbol differs between the market-data universe and the spot-price
/// service: the post-crash Terra chain is listed as `LUNA1-USD` in the
/// universe but under plain `LUNA` on the spot service, so it is remapped
/// before the exchange translation.
pub fn to_spot_symbol(symbol: &str) -> String {
    let symbol = if symbol == "LUNA1-USD" {
        "LUNA-USD"
    } else {
        symbol
    };
    to_exchange_symbol(symbol)
}
