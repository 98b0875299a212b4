use thiserror::Error;

/// Errors surfaced by the analytics pipeline
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("market data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("insufficient history for {symbol}: {points} points, need at least {required}")]
    InsufficientHistory {
        symbol: String,
        points: usize,
        required: usize,
    },

    #[error("model training failed for {symbol}: {reason}")]
    TrainingFailed { symbol: String, reason: String },

    #[error("unrecognized range code: '{code}'")]
    InvalidRange { code: String },

    #[error("{operation} timed out after {timeout_secs}s")]
    Timeout {
        operation: String,
        timeout_secs: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_history_formatting() {
        let err = AnalyticsError::InsufficientHistory {
            symbol: "BTC-USD".to_string(),
            points: 12,
            required: 60,
        };

        let msg = err.to_string();
        assert!(msg.contains("BTC-USD"));
        assert!(msg.contains("12"));
        assert!(msg.contains("60"));
    }

    #[test]
    fn test_invalid_range_formatting() {
        let err = AnalyticsError::InvalidRange {
            code: "7w".to_string(),
        };
        assert!(err.to_string().contains("'7w'"));
    }

    #[test]
    fn test_timeout_formatting() {
        let err = AnalyticsError::Timeout {
            operation: "forecast training".to_string(),
            timeout_secs: 120,
        };

        let msg = err.to_string();
        assert!(msg.contains("forecast training"));
        assert!(msg.contains("120"));
    }
}
