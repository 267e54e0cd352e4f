//! Date alignment of fund and benchmark series.
//!
//! Both inputs are reduced to the intersection of their dates so that every
//! index refers to the same trading day on either side.

use crate::error::{AnalyticsError, Result};
use crate::types::{sort_dedup, PricePoint, ReturnSeries, TimeSeries};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Two series with identical dates, index for index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPair {
    fund: TimeSeries,
    benchmark: TimeSeries,
}

impl AlignedPair {
    pub fn fund(&self) -> &TimeSeries {
        &self.fund
    }

    pub fn benchmark(&self) -> &TimeSeries {
        &self.benchmark
    }

    /// Number of common dates.
    pub fn len(&self) -> usize {
        self.fund.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fund.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.fund.dates()
    }

    /// Fail with [`AnalyticsError::AlignmentEmpty`] when no dates are shared.
    pub fn require_overlap(self) -> Result<Self> {
        if self.is_empty() {
            Err(AnalyticsError::AlignmentEmpty)
        } else {
            Ok(self)
        }
    }

    /// Split into the fund and benchmark series.
    pub fn into_parts(self) -> (TimeSeries, TimeSeries) {
        (self.fund, self.benchmark)
    }

    /// Apply the same transform to both sides.
    ///
    /// The transform must preserve dates (normalization does).
    pub(crate) fn try_map<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(&TimeSeries) -> Result<TimeSeries>,
    {
        let fund = f(&self.fund)?;
        let benchmark = f(&self.benchmark)?;
        debug_assert!(fund.dates().eq(benchmark.dates()));
        Ok(Self { fund, benchmark })
    }
}

/// Align two raw observation sets, naming the sides "fund" and "benchmark".
pub fn align(fund: &[PricePoint], benchmark: &[PricePoint]) -> AlignedPair {
    align_named(("fund", fund), ("benchmark", benchmark))
}

/// Align two series, keeping their display names.
pub fn align_series(fund: &TimeSeries, benchmark: &TimeSeries) -> AlignedPair {
    align_named(
        (fund.name(), fund.points()),
        (benchmark.name(), benchmark.points()),
    )
}

fn align_named(fund: (&str, &[PricePoint]), benchmark: (&str, &[PricePoint])) -> AlignedPair {
    let fund_points = sort_dedup(fund.1.to_vec());
    let bench_points = sort_dedup(benchmark.1.to_vec());

    // Both sides are sorted with unique dates, so a merge walk yields the
    // intersection in ascending order.
    let mut fund_out = Vec::new();
    let mut bench_out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < fund_points.len() && j < bench_points.len() {
        let (fd, bd) = (fund_points[i].date(), bench_points[j].date());
        if fd < bd {
            i += 1;
        } else if bd < fd {
            j += 1;
        } else {
            fund_out.push(fund_points[i]);
            bench_out.push(bench_points[j]);
            i += 1;
            j += 1;
        }
    }

    AlignedPair {
        fund: TimeSeries::from_sorted(fund.0, fund_out),
        benchmark: TimeSeries::from_sorted(benchmark.0, bench_out),
    }
}

/// Reduce two derived series to dates where both are defined.
///
/// Output is ascending by date as `(date, fund_value, benchmark_value)`.
pub fn align_returns(fund: &ReturnSeries, benchmark: &ReturnSeries) -> Vec<(NaiveDate, f64, f64)> {
    // First observation per date wins, even when it is undefined.
    let mut bench_map: HashMap<NaiveDate, Option<f64>> = HashMap::new();
    for point in benchmark.points() {
        bench_map.entry(point.date).or_insert(point.value);
    }

    let mut seen = HashSet::new();
    let mut rows: Vec<(NaiveDate, f64, f64)> = fund
        .points()
        .iter()
        .filter(|point| seen.insert(point.date))
        .filter_map(|point| {
            let f = point.value?;
            let b = (*bench_map.get(&point.date)?)?;
            Some((point.date, f, b))
        })
        .collect();
    rows.sort_by_key(|(date, _, _)| *date);
    rows
}
