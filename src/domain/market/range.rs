//! Range codes and their data-fetch configuration.
//!
//! Each user-selectable range carries its `(period, interval)` pair and the
//! Bollinger window to use for that sampling density as data, so no logic
//! branches on raw strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::AnalyticsError;

/// Sampling interval of a fetched series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    OneMinute,
    FifteenMinutes,
    OneHour,
    OneDay,
}

impl Interval {
    /// Interval code used by the exchange klines endpoint.
    pub fn exchange_code(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FifteenMinutes => "15m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
        }
    }

    /// Width of one bar in milliseconds.
    pub fn step_ms(&self) -> i64 {
        match self {
            Interval::OneMinute => 60_000,
            Interval::FifteenMinutes => 900_000,
            Interval::OneHour => 3_600_000,
            Interval::OneDay => 86_400_000,
        }
    }
}

/// Trailing window of history to request from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Hours(u32),
    Days(u32),
    Years(u32),
    /// Full available history.
    Max,
}

/// How the dataset for a range is obtained: fetched directly, or sliced out
/// of the cached one-year daily dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    Fetch { period: Period, interval: Interval },
    SliceOfYear { months: u32 },
}

/// A user-selectable time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeCode {
    OneHour,
    FourHours,
    OneDay,
    FiveDays,
    OneMonth,
    TwoMonths,
    ThreeMonths,
    OneYear,
    Max,
}

impl RangeCode {
    pub const ALL: [RangeCode; 9] = [
        RangeCode::OneHour,
        RangeCode::FourHours,
        RangeCode::OneDay,
        RangeCode::FiveDays,
        RangeCode::OneMonth,
        RangeCode::TwoMonths,
        RangeCode::ThreeMonths,
        RangeCode::OneYear,
        RangeCode::Max,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            RangeCode::OneHour => "1h",
            RangeCode::FourHours => "4h",
            RangeCode::OneDay => "1d",
            RangeCode::FiveDays => "5d",
            RangeCode::OneMonth => "1mo",
            RangeCode::TwoMonths => "2mo",
            RangeCode::ThreeMonths => "3mo",
            RangeCode::OneYear => "1y",
            RangeCode::Max => "max",
        }
    }

    pub fn source(&self) -> DataSource {
        match self {
            RangeCode::OneHour => DataSource::Fetch {
                period: Period::Hours(1),
                interval: Interval::OneMinute,
            },
            RangeCode::FourHours => DataSource::Fetch {
                period: Period::Hours(4),
                interval: Interval::OneMinute,
            },
            RangeCode::OneDay => DataSource::Fetch {
                period: Period::Days(1),
                interval: Interval::FifteenMinutes,
            },
            RangeCode::FiveDays => DataSource::Fetch {
                period: Period::Days(5),
                interval: Interval::OneHour,
            },
            RangeCode::OneMonth => DataSource::SliceOfYear { months: 1 },
            RangeCode::TwoMonths => DataSource::SliceOfYear { months: 2 },
            RangeCode::ThreeMonths => DataSource::SliceOfYear { months: 3 },
            RangeCode::OneYear => DataSource::Fetch {
                period: Period::Years(1),
                interval: Interval::OneDay,
            },
            RangeCode::Max => DataSource::Fetch {
                period: Period::Max,
                interval: Interval::OneDay,
            },
        }
    }

    /// The rolling window driving the volatility bands for this range.
    /// Minute-sampled ranges use the tighter window.
    pub fn boll_window(&self) -> usize {
        match self.source() {
            DataSource::Fetch {
                interval: Interval::OneMinute | Interval::FifteenMinutes | Interval::OneHour,
                ..
            } => 18,
            _ => 30,
        }
    }
}

impl fmt::Display for RangeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for RangeCode {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1h" => Ok(RangeCode::OneHour),
            "4h" => Ok(RangeCode::FourHours),
            "1d" => Ok(RangeCode::OneDay),
            "5d" => Ok(RangeCode::FiveDays),
            "1mo" => Ok(RangeCode::OneMonth),
            "2mo" => Ok(RangeCode::TwoMonths),
            "3mo" => Ok(RangeCode::ThreeMonths),
            "1y" => Ok(RangeCode::OneYear),
            "max" => Ok(RangeCode::Max),
            other => Err(AnalyticsError::InvalidRange {
                code: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_codes() {
        for range in RangeCode::ALL {
            let parsed: RangeCode = range.code().parse().unwrap();
            assert_eq!(parsed, range);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("MAX".parse::<RangeCode>().unwrap(), RangeCode::Max);
        assert_eq!("1Y".parse::<RangeCode>().unwrap(), RangeCode::OneYear);
    }

    #[test]
    fn test_parse_unknown_code() {
        let err = "7w".parse::<RangeCode>().unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidRange { code } if code == "7w"));
    }

    #[test]
    fn test_boll_window_by_sampling_density() {
        assert_eq!(RangeCode::OneHour.boll_window(), 18);
        assert_eq!(RangeCode::OneDay.boll_window(), 18);
        assert_eq!(RangeCode::FiveDays.boll_window(), 18);
        assert_eq!(RangeCode::OneMonth.boll_window(), 30);
        assert_eq!(RangeCode::OneYear.boll_window(), 30);
        assert_eq!(RangeCode::Max.boll_window(), 30);
    }

    #[test]
    fn test_month_ranges_slice_the_year_dataset() {
        assert_eq!(
            RangeCode::TwoMonths.source(),
            DataSource::SliceOfYear { months: 2 }
        );
        assert!(matches!(
            RangeCode::OneYear.source(),
            DataSource::Fetch {
                period: Period::Years(1),
                interval: Interval::OneDay,
            }
        ));
    }
}
