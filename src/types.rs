//! Core data types for NAV and benchmark analytics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One NAV or closing-price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    date: NaiveDate,
    value: f64,
}

impl PricePoint {
    /// Create a new observation.
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    /// Observation date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Observed NAV or close.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Check that the value is a finite, strictly positive price.
    pub fn is_valid(&self) -> bool {
        self.value.is_finite() && self.value > 0.0
    }
}

impl fmt::Display for PricePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.4}", self.date, self.value)
    }
}

/// Sort by date (stable) and keep the first observation for each date.
pub(crate) fn sort_dedup(mut points: Vec<PricePoint>) -> Vec<PricePoint> {
    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);
    points
}

/// Price series ordered by strictly increasing date.
///
/// The only public constructor sorts its input and drops repeated dates,
/// so every `TimeSeries` satisfies the ordering invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    name: String,
    points: Vec<PricePoint>,
}

impl TimeSeries {
    /// Build a series from observations in any order.
    ///
    /// When a date appears more than once, the first occurrence in input
    /// order wins.
    pub fn new(name: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            name: name.into(),
            points: sort_dedup(points),
        }
    }

    /// Build a series from points already sorted with unique dates.
    pub(crate) fn from_sorted(name: impl Into<String>, points: Vec<PricePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self {
            name: name.into(),
            points,
        }
    }

    /// Display name of the fund or benchmark.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the same series under a different display name.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: self.points,
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// All values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// All dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Value observed on an exact date.
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Sub-series with dates in `[start, end]` (inclusive).
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> TimeSeries {
        let points = self
            .points
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect();
        Self::from_sorted(self.name.clone(), points)
    }

    /// Sub-series with dates on or after `start`.
    pub fn since(&self, start: NaiveDate) -> TimeSeries {
        let idx = self.points.partition_point(|p| p.date < start);
        Self::from_sorted(self.name.clone(), self.points[idx..].to_vec())
    }
}

/// One value of a derived series; `None` means "not available".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl ReturnPoint {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }

    pub fn defined(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value: Some(value),
        }
    }

    pub fn undefined(date: NaiveDate) -> Self {
        Self { date, value: None }
    }
}

/// Date-ordered derived series (returns, volatility, drawdown), in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    name: String,
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn new(name: impl Into<String>, points: Vec<ReturnPoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Raw values, `None` where undefined.
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Iterate over `(date, value)` for defined points only.
    pub fn defined(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.date, v)))
    }

    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }

    /// Last point's value, which may itself be undefined.
    pub fn last_value(&self) -> Option<f64> {
        self.points.last().and_then(|p| p.value)
    }

    /// Smallest defined value.
    pub fn min_defined(&self) -> Option<f64> {
        self.defined().map(|(_, v)| v).reduce(f64::min)
    }

    /// Value on an exact date (`None` if absent or undefined).
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .and_then(|i| self.points[i].value)
    }

    /// Drop the first `n` points.
    pub fn skip(&self, n: usize) -> ReturnSeries {
        let start = n.min(self.points.len());
        Self::new(self.name.clone(), self.points[start..].to_vec())
    }
}

/// Snapshot comparison of one metric between fund and benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonStat {
    pub metric_name: String,
    pub fund_value: Option<f64>,
    pub benchmark_value: Option<f64>,
    /// `fund - benchmark`, defined only when both sides are.
    pub difference: Option<f64>,
}

impl ComparisonStat {
    pub fn new(
        metric_name: impl Into<String>,
        fund_value: Option<f64>,
        benchmark_value: Option<f64>,
    ) -> Self {
        let difference = match (fund_value, benchmark_value) {
            (Some(f), Some(b)) => Some(f - b),
            _ => None,
        };
        Self {
            metric_name: metric_name.into(),
            fund_value,
            benchmark_value,
            difference,
        }
    }
}
