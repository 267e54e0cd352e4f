//! Rebasing of series to a common starting level of 100.

use crate::align::AlignedPair;
use crate::error::Result;
use crate::returns::{check_reference, empty_series};
use crate::types::{PricePoint, TimeSeries};

/// Base level of a normalized series.
pub const NORMALIZED_BASE: f64 = 100.0;

/// Rescale a series so its first value is exactly 100.
///
/// Every later point keeps its ratio to the first one:
/// `normalized[i] = value[i] / value[0] * 100`.
pub fn normalize(series: &TimeSeries) -> Result<TimeSeries> {
    let first = series.first().ok_or_else(|| empty_series(series))?;
    let base = check_reference(series.name(), first.date(), first.value())?;

    let points = series
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let value = if i == 0 {
                NORMALIZED_BASE
            } else {
                p.value() / base * NORMALIZED_BASE
            };
            PricePoint::new(p.date(), value)
        })
        .collect();

    Ok(TimeSeries::from_sorted(series.name(), points))
}

/// Normalize both sides of a pair, each against its own first value.
pub fn normalize_pair(pair: &AlignedPair) -> Result<AlignedPair> {
    pair.try_map(normalize)
}
