//! How often, and by how much, a fund beat its benchmark.

use crate::align::{align_returns, AlignedPair};
use crate::error::{AnalyticsError, Result};
use crate::returns::{rolling_return, RollingWindow};
use crate::types::ReturnSeries;
use serde::{Deserialize, Serialize};

/// Outperformance statistics over comparable periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outperformance {
    /// Share of periods where the fund return exceeded the benchmark's (percent).
    pub pct_periods_outperformed: f64,
    /// Mean of `fund - benchmark` over all periods (percentage points).
    pub avg_excess: f64,
    /// Number of periods compared.
    pub periods: usize,
}

/// Compare two return series on the dates where both are defined.
pub fn outperformance(fund: &ReturnSeries, benchmark: &ReturnSeries) -> Result<Outperformance> {
    let rows = align_returns(fund, benchmark);
    if rows.is_empty() {
        return Err(AnalyticsError::InsufficientData(format!(
            "no comparable periods between {} and {}",
            fund.name(),
            benchmark.name()
        )));
    }

    let n = rows.len();
    let (wins, total_excess) = rows
        .iter()
        .map(|(_, f, b)| f - b)
        .fold((0usize, 0.0), |(wins, sum), excess| {
            (wins + usize::from(excess > 0.0), sum + excess)
        });

    Ok(Outperformance {
        pct_periods_outperformed: wins as f64 / n as f64 * 100.0,
        avg_excess: total_excess / n as f64,
        periods: n,
    })
}

/// Outperformance of rolling returns for both sides of an aligned pair.
pub fn rolling_outperformance(pair: &AlignedPair, window: RollingWindow) -> Result<Outperformance> {
    let fund = rolling_return(pair.fund(), window.periods())?;
    let benchmark = rolling_return(pair.benchmark(), window.periods())?;
    outperformance(&fund, &benchmark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align;
    use crate::types::{PricePoint, ReturnPoint};
    use chrono::{Duration, NaiveDate};

    fn returns(name: &str, values: &[Option<f64>]) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        ReturnSeries::new(
            name,
            values
                .iter()
                .enumerate()
                .map(|(i, v)| ReturnPoint::new(start + Duration::days(i as i64), *v))
                .collect(),
        )
    }

    #[test]
    fn test_outperformance() {
        let fund = returns("fund", &[Some(1.0), Some(-1.0), Some(2.0)]);
        let bench = returns("bench", &[Some(0.0), Some(0.0), Some(1.0)]);

        let stats = outperformance(&fund, &bench).unwrap();
        assert_eq!(stats.periods, 3);
        assert!((stats.pct_periods_outperformed - 200.0 / 3.0).abs() < 1e-10);
        assert!((stats.avg_excess - 1.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_outperformance_ties_do_not_count() {
        let fund = returns("fund", &[Some(1.0), Some(2.0)]);
        let bench = returns("bench", &[Some(1.0), Some(1.0)]);

        let stats = outperformance(&fund, &bench).unwrap();
        assert!((stats.pct_periods_outperformed - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_outperformance_ignores_undefined() {
        let fund = returns("fund", &[None, Some(3.0), Some(1.0)]);
        let bench = returns("bench", &[Some(1.0), None, Some(2.0)]);

        let stats = outperformance(&fund, &bench).unwrap();
        assert_eq!(stats.periods, 1);
        assert_eq!(stats.pct_periods_outperformed, 0.0);
        assert!((stats.avg_excess - (-1.0)).abs() < 1e-10);
    }

    #[test]
    fn test_outperformance_no_comparable_periods() {
        let fund = returns("fund", &[None, None]);
        let bench = returns("bench", &[Some(1.0), Some(1.0)]);

        assert!(matches!(
            outperformance(&fund, &bench),
            Err(AnalyticsError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_rolling_outperformance_needs_history() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let pts: Vec<PricePoint> = (0..10)
            .map(|i| PricePoint::new(start + Duration::days(i), 100.0 + i as f64))
            .collect();
        let pair = align(&pts, &pts);

        assert!(matches!(
            rolling_outperformance(&pair, RollingWindow::OneMonth),
            Err(AnalyticsError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_rolling_outperformance() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let fund: Vec<PricePoint> = (0..60)
            .map(|i| PricePoint::new(start + Duration::days(i), 100.0 * 1.01_f64.powi(i as i32)))
            .collect();
        let bench: Vec<PricePoint> = (0..60)
            .map(|i| PricePoint::new(start + Duration::days(i), 100.0 * 1.005_f64.powi(i as i32)))
            .collect();
        let pair = align(&fund, &bench);

        let stats = rolling_outperformance(&pair, RollingWindow::OneMonth).unwrap();
        assert_eq!(stats.periods, 30);
        assert_eq!(stats.pct_periods_outperformed, 100.0);
        assert!(stats.avg_excess > 0.0);
    }
}
