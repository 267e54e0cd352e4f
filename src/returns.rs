//! Return calculations over NAV and price series.
//!
//! All returns are expressed in percent. A return that cannot be computed
//! from the available history is reported as `None`, never as zero.

use crate::error::{AnalyticsError, Result};
use crate::types::{ReturnPoint, ReturnSeries, TimeSeries};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Percentage change from `from` to `to`.
pub fn pct_change(from: f64, to: f64) -> f64 {
    (to / from - 1.0) * 100.0
}

/// Reject a zero or non-finite reference value before dividing by it.
pub(crate) fn check_reference(series: &str, date: NaiveDate, value: f64) -> Result<f64> {
    if value == 0.0 || !value.is_finite() {
        return Err(AnalyticsError::DegenerateSeries(format!(
            "{}: reference value on {} is {}",
            series, date, value
        )));
    }
    Ok(value)
}

pub(crate) fn empty_series(series: &TimeSeries) -> AnalyticsError {
    AnalyticsError::DegenerateSeries(format!("{}: series is empty", series.name()))
}

/// Fixed look-back horizons reported for a fund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    /// Previous observation (one trading day).
    OneDay,
    /// Seven calendar days.
    OneWeek,
    /// Thirty calendar days.
    OneMonth,
    /// 365 calendar days.
    OneYear,
    /// Whole available history.
    Total,
}

impl Horizon {
    pub const ALL: [Horizon; 5] = [
        Horizon::OneDay,
        Horizon::OneWeek,
        Horizon::OneMonth,
        Horizon::OneYear,
        Horizon::Total,
    ];

    /// Calendar look-back, for the horizons defined by one.
    pub fn lookback_days(&self) -> Option<i64> {
        match self {
            Horizon::OneWeek => Some(7),
            Horizon::OneMonth => Some(30),
            Horizon::OneYear => Some(365),
            Horizon::OneDay | Horizon::Total => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Horizon::OneDay => "1-Day Return",
            Horizon::OneWeek => "1-Week Return",
            Horizon::OneMonth => "1-Month Return",
            Horizon::OneYear => "1-Year Return",
            Horizon::Total => "Total Return",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Return over the last `lookback_days` calendar days.
///
/// The window starts at the earliest observation on or after
/// `latest_date - lookback_days`. Yields `Ok(None)` when the history does
/// not reach back that far, or when the latest observation is the only one
/// inside the window.
pub fn fixed_horizon_return(series: &TimeSeries, lookback_days: i64) -> Result<Option<f64>> {
    if lookback_days <= 0 {
        return Err(AnalyticsError::InvalidInput(format!(
            "lookback must be positive, got {} days",
            lookback_days
        )));
    }
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(empty_series(series)),
    };

    let window_start = last.date() - Duration::days(lookback_days);
    if first.date() > window_start {
        return Ok(None);
    }

    let points = series.points();
    let idx = points.partition_point(|p| p.date() < window_start);
    let start = &points[idx];
    if start.date() == last.date() {
        return Ok(None);
    }

    let base = check_reference(series.name(), start.date(), start.value())?;
    Ok(Some(pct_change(base, last.value())))
}

/// Return between the last two observations.
pub fn previous_return(series: &TimeSeries) -> Result<Option<f64>> {
    let points = series.points();
    match points {
        [] => Err(empty_series(series)),
        [_] => Ok(None),
        [.., prev, last] => {
            let base = check_reference(series.name(), prev.date(), prev.value())?;
            Ok(Some(pct_change(base, last.value())))
        }
    }
}

/// Return from the first to the last observation.
pub fn total_return(series: &TimeSeries) -> Result<f64> {
    let points = series.points();
    match points {
        [] => Err(empty_series(series)),
        [_] => Err(AnalyticsError::InsufficientData(format!(
            "{}: total return needs at least 2 observations",
            series.name()
        ))),
        [first, .., last] => {
            let base = check_reference(series.name(), first.date(), first.value())?;
            Ok(pct_change(base, last.value()))
        }
    }
}

/// Return for one of the standard horizons.
pub fn horizon_return(series: &TimeSeries, horizon: Horizon) -> Result<Option<f64>> {
    match horizon {
        Horizon::OneDay => previous_return(series),
        Horizon::Total => match total_return(series) {
            Ok(r) => Ok(Some(r)),
            Err(AnalyticsError::InsufficientData(_)) => Ok(None),
            Err(e) => Err(e),
        },
        Horizon::OneWeek | Horizon::OneMonth | Horizon::OneYear => match horizon.lookback_days() {
            Some(days) => fixed_horizon_return(series, days),
            None => Ok(None),
        },
    }
}

/// Standard rolling-return windows, in observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RollingWindow {
    OneMonth,
    ThreeMonth,
    SixMonth,
}

impl RollingWindow {
    pub const ALL: [RollingWindow; 3] = [
        RollingWindow::OneMonth,
        RollingWindow::ThreeMonth,
        RollingWindow::SixMonth,
    ];

    /// Window length as a trading-day offset.
    pub fn periods(&self) -> usize {
        match self {
            RollingWindow::OneMonth => 30,
            RollingWindow::ThreeMonth => 90,
            RollingWindow::SixMonth => 180,
        }
    }

    /// Map an observation count back to a standard window.
    pub fn from_periods(periods: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.periods() == periods)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RollingWindow::OneMonth => "1-Month",
            RollingWindow::ThreeMonth => "3-Month",
            RollingWindow::SixMonth => "6-Month",
        }
    }
}

impl fmt::Display for RollingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rolling return over `window` observations.
///
/// The window is a trading-day offset: the value at position `i` compares
/// against position `i - window` of the same series, so fund and benchmark
/// are windowed identically once aligned. The first `window` values are
/// undefined.
pub fn rolling_return(series: &TimeSeries, window: usize) -> Result<ReturnSeries> {
    if window == 0 {
        return Err(AnalyticsError::InvalidInput(
            "rolling window must be at least 1 observation".to_string(),
        ));
    }

    let points = series.points();
    let mut out = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        if i < window {
            out.push(ReturnPoint::undefined(point.date()));
            continue;
        }
        let base = &points[i - window];
        let base_value = check_reference(series.name(), base.date(), base.value())?;
        out.push(ReturnPoint::defined(
            point.date(),
            pct_change(base_value, point.value()),
        ));
    }

    Ok(ReturnSeries::new(series.name(), out))
}

/// Headline return figures for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsSummary {
    pub name: String,
    pub latest_value: f64,
    pub latest_date: NaiveDate,
    pub first_date: NaiveDate,
    pub one_day: Option<f64>,
    pub one_week: Option<f64>,
    pub one_month: Option<f64>,
    pub one_year: Option<f64>,
    pub total: Option<f64>,
}

impl ReturnsSummary {
    /// Compute every standard horizon for a non-empty series.
    pub fn from_series(series: &TimeSeries) -> Result<Self> {
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(empty_series(series)),
        };

        Ok(Self {
            name: series.name().to_string(),
            latest_value: last.value(),
            latest_date: last.date(),
            first_date: first.date(),
            one_day: horizon_return(series, Horizon::OneDay)?,
            one_week: horizon_return(series, Horizon::OneWeek)?,
            one_month: horizon_return(series, Horizon::OneMonth)?,
            one_year: horizon_return(series, Horizon::OneYear)?,
            total: horizon_return(series, Horizon::Total)?,
        })
    }

    /// Value for a given horizon.
    pub fn get(&self, horizon: Horizon) -> Option<f64> {
        match horizon {
            Horizon::OneDay => self.one_day,
            Horizon::OneWeek => self.one_week,
            Horizon::OneMonth => self.one_month,
            Horizon::OneYear => self.one_year,
            Horizon::Total => self.total,
        }
    }
}
