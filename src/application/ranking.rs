//! Leaderboard ranking over a universe of instruments.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::analytics::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::domain::market::types::TimeSeries;

/// Percentage change of the closing price across a series.
///
/// The change is measured against the final close, not the initial one;
/// this matches the reference output and must not be flipped.
/// Returns `None` when the series has fewer than two points or either
/// endpoint is not finite.
pub fn percent_change(series: &TimeSeries) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let first = series.first_close()?;
    let last = series.last_close()?;
    if !first.is_finite() || !last.is_finite() {
        return None;
    }

    let pct = ((last - first) / last) * 100.0;
    Some((pct * 100.0).round() / 100.0)
}

/// Ranks `instruments` by percentage price change over their series.
///
/// Instruments with no series, too little data, or non-finite endpoint
/// closes are dropped rather than failing the whole leaderboard. Ties keep
/// the universe order (stable sort).
pub fn compute_leaderboard(
    instruments: &[String],
    series_by_instrument: &HashMap<String, TimeSeries>,
) -> Leaderboard {
    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(instruments.len());

    for symbol in instruments {
        let Some(series) = series_by_instrument.get(symbol) else {
            debug!("Leaderboard: no series for {}, dropping", symbol);
            continue;
        };
        match percent_change(series) {
            Some(pct) => entries.push(LeaderboardEntry {
                symbol: symbol.clone(),
                pct_change: pct,
            }),
            None => debug!("Leaderboard: undefined change for {}, dropping", symbol),
        }
    }

    entries.sort_by(|a, b| {
        b.pct_change
            .partial_cmp(&a.pct_change)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Leaderboard { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::range::Interval;
    use crate::domain::market::types::Candle;

    fn series(symbol: &str, closes: &[f64]) -> TimeSeries {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp_ms: i as i64 * 86_400_000,
                open: close,
                high: close,
                low: close,
                close,
                volume: 100.0,
            })
            .collect();
        TimeSeries::new(symbol, Interval::OneDay, candles)
    }

    fn universe(
        data: &[(&str, &[f64])],
    ) -> (Vec<String>, HashMap<String, TimeSeries>) {
        let symbols: Vec<String> = data.iter().map(|(s, _)| s.to_string()).collect();
        let map = data
            .iter()
            .map(|(s, closes)| (s.to_string(), series(s, closes)))
            .collect();
        (symbols, map)
    }

    #[test]
    fn test_percent_change_divides_by_last_close() {
        // ((11 - 10) / 11) * 100 = 9.0909... -> 9.09
        let s = series("BTC-USD", &[10.0, 12.0, 9.0, 15.0, 11.0]);
        assert_eq!(percent_change(&s), Some(9.09));
    }

    #[test]
    fn test_percent_change_needs_two_points() {
        let s = series("BTC-USD", &[10.0]);
        assert_eq!(percent_change(&s), None);
    }

    #[test]
    fn test_percent_change_nan_endpoint_undefined() {
        let s = series("BTC-USD", &[f64::NAN, 12.0, 11.0]);
        assert_eq!(percent_change(&s), None);

        let s = series("BTC-USD", &[10.0, 12.0, f64::NAN]);
        assert_eq!(percent_change(&s), None);
    }

    #[test]
    fn test_leaderboard_sorted_descending() {
        let (symbols, map) = universe(&[
            ("ADA-USD", &[10.0, 11.0][..]),
            ("BTC-USD", &[10.0, 20.0][..]),
            ("ETH-USD", &[10.0, 8.0][..]),
        ]);

        let lb = compute_leaderboard(&symbols, &map);
        assert_eq!(lb.len(), 3);
        assert_eq!(lb.entries[0].symbol, "BTC-USD");
        assert_eq!(lb.entries[2].symbol, "ETH-USD");
        for pair in lb.entries.windows(2) {
            assert!(pair[0].pct_change >= pair[1].pct_change);
        }
    }

    #[test]
    fn test_leaderboard_excludes_nan_instruments() {
        let (symbols, map) = universe(&[
            ("ADA-USD", &[10.0, 11.0][..]),
            ("BAD-USD", &[f64::NAN, 50.0][..]),
            ("ETH-USD", &[10.0, 8.0][..]),
        ]);

        let lb = compute_leaderboard(&symbols, &map);
        assert_eq!(lb.len(), 2);
        assert!(lb.entries.iter().all(|e| e.symbol != "BAD-USD"));
    }

    #[test]
    fn test_leaderboard_ties_keep_universe_order() {
        let (symbols, map) = universe(&[
            ("ADA-USD", &[10.0, 11.0][..]),
            ("BTC-USD", &[20.0, 22.0][..]),
            ("ETH-USD", &[5.0, 5.5][..]),
        ]);

        // All three gained the same 9.09%
        let lb = compute_leaderboard(&symbols, &map);
        let order: Vec<&str> = lb.entries.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(order, vec!["ADA-USD", "BTC-USD", "ETH-USD"]);
    }

    #[test]
    fn test_leaderboard_missing_series_dropped() {
        let (mut symbols, map) = universe(&[("ADA-USD", &[10.0, 11.0][..])]);
        symbols.push("GHOST-USD".to_string());

        let lb = compute_leaderboard(&symbols, &map);
        assert_eq!(lb.len(), 1);
    }
}
