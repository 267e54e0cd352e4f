//! Lookback periods used to trim a fund's history before comparison.

use crate::error::{AnalyticsError, Result};
use crate::types::TimeSeries;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named lookback period, measured back from the latest observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimePeriod {
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    #[default]
    OneYear,
    #[serde(rename = "3y")]
    ThreeYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "all")]
    AllTime,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 7] = [
        TimePeriod::OneMonth,
        TimePeriod::ThreeMonths,
        TimePeriod::SixMonths,
        TimePeriod::OneYear,
        TimePeriod::ThreeYears,
        TimePeriod::FiveYears,
        TimePeriod::AllTime,
    ];

    /// Calendar days covered, `None` for the full history.
    pub fn days(&self) -> Option<i64> {
        match self {
            TimePeriod::OneMonth => Some(30),
            TimePeriod::ThreeMonths => Some(90),
            TimePeriod::SixMonths => Some(180),
            TimePeriod::OneYear => Some(365),
            TimePeriod::ThreeYears => Some(1095),
            TimePeriod::FiveYears => Some(1825),
            TimePeriod::AllTime => None,
        }
    }

    /// Short code accepted by [`FromStr`].
    pub fn code(&self) -> &'static str {
        match self {
            TimePeriod::OneMonth => "1m",
            TimePeriod::ThreeMonths => "3m",
            TimePeriod::SixMonths => "6m",
            TimePeriod::OneYear => "1y",
            TimePeriod::ThreeYears => "3y",
            TimePeriod::FiveYears => "5y",
            TimePeriod::AllTime => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimePeriod::OneMonth => "1 Month",
            TimePeriod::ThreeMonths => "3 Months",
            TimePeriod::SixMonths => "6 Months",
            TimePeriod::OneYear => "1 Year",
            TimePeriod::ThreeYears => "3 Years",
            TimePeriod::FiveYears => "5 Years",
            TimePeriod::AllTime => "All Time",
        }
    }

    /// Keep the points dated on or after `last_date - days`.
    pub fn apply(&self, series: &TimeSeries) -> TimeSeries {
        match (self.days(), series.last()) {
            (Some(days), Some(last)) => series.since(last.date() - Duration::days(days)),
            _ => series.clone(),
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TimePeriod {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_lowercase();
        TimePeriod::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .ok_or_else(|| {
                AnalyticsError::InvalidInput(format!(
                    "unknown period '{}', expected one of 1m, 3m, 6m, 1y, 3y, 5y, all",
                    s
                ))
            })
    }
}
