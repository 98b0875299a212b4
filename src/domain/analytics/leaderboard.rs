use serde::{Deserialize, Serialize};

/// One ranked instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub symbol: String,
    /// Percentage change of the closing price over the range, rounded to
    /// two decimal places.
    pub pct_change: f64,
}

/// Instruments ranked by percentage price change, best first.
///
/// Instruments whose change could not be computed are absent; ties keep the
/// original universe order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best `n` performers, in rank order.
    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Worst `n` performers, worst last (tail of the ranking).
    pub fn bottom(&self, n: usize) -> &[LeaderboardEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}
