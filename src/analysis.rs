//! End-to-end fund versus benchmark analysis.
//!
//! [`FundAnalysis::run`] takes two validated series and an explicit
//! [`AnalysisRequest`] and produces an [`AnalysisReport`] holding every
//! derived series and statistic the presentation layer needs.

use crate::align::{align_series, AlignedPair};
use crate::error::{AnalyticsError, Result};
use crate::normalize::normalize_pair;
use crate::outperformance::{outperformance, Outperformance};
use crate::period::TimePeriod;
use crate::returns::{empty_series, rolling_return, total_return, ReturnsSummary, RollingWindow};
use crate::risk::{
    current_drawdown, daily_returns, drawdown, max_drawdown, mean_defined, rolling_volatility,
    DEFAULT_VOLATILITY_WINDOW, TRADING_DAYS_PER_YEAR,
};
use crate::types::{ComparisonStat, ReturnSeries, TimeSeries};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Parameters of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub period: TimePeriod,
    pub rolling_windows: Vec<RollingWindow>,
    pub volatility_window: usize,
    pub periods_per_year: f64,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            period: TimePeriod::default(),
            rolling_windows: RollingWindow::ALL.to_vec(),
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl AnalysisRequest {
    pub fn with_period(mut self, period: TimePeriod) -> Self {
        self.period = period;
        self
    }
}

/// Rolling returns of both sides for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingComparison {
    pub window: RollingWindow,
    pub fund: ReturnSeries,
    pub benchmark: ReturnSeries,
    /// `None` when the window is longer than the aligned history.
    pub outperformance: Option<Outperformance>,
}

/// Everything derived from the aligned fund and benchmark series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkComparison {
    pub benchmark_name: String,
    pub normalized: AlignedPair,
    pub stats: Vec<ComparisonStat>,
    pub fund_volatility: ReturnSeries,
    pub benchmark_volatility: ReturnSeries,
    pub fund_drawdown: ReturnSeries,
    pub benchmark_drawdown: ReturnSeries,
    pub rolling: Vec<RollingComparison>,
}

impl BenchmarkComparison {
    /// Look up a comparison statistic by name.
    pub fn stat(&self, metric_name: &str) -> Option<&ComparisonStat> {
        self.stats.iter().find(|s| s.metric_name == metric_name)
    }
}

/// Result of [`FundAnalysis::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub fund_name: String,
    pub period: TimePeriod,
    /// Headline returns over the fund's full history.
    pub summary: ReturnsSummary,
    /// Absent when fund and benchmark share no dates in the period.
    pub comparison: Option<BenchmarkComparison>,
}

/// Analysis driver.
pub struct FundAnalysis;

impl FundAnalysis {
    /// Analyze `fund` against `benchmark` for the requested period.
    pub fn run(
        fund: &TimeSeries,
        benchmark: &TimeSeries,
        request: &AnalysisRequest,
    ) -> Result<AnalysisReport> {
        if fund.is_empty() {
            return Err(empty_series(fund));
        }

        info!(
            "Analyzing {} against {} over {}",
            fund.name(),
            benchmark.name(),
            request.period
        );

        let summary = ReturnsSummary::from_series(fund)?;

        let fund_period = request.period.apply(fund);
        let benchmark_period = match (fund_period.first(), fund_period.last()) {
            (Some(first), Some(last)) => benchmark.between(first.date(), last.date()),
            _ => benchmark.clone(),
        };

        let aligned = align_series(&fund_period, &benchmark_period);
        let comparison = if aligned.is_empty() {
            warn!(
                "No common dates between {} and {} in {}; skipping comparison",
                fund.name(),
                benchmark.name(),
                request.period
            );
            None
        } else {
            Some(Self::compare(&aligned, request)?)
        };

        Ok(AnalysisReport {
            fund_name: fund.name().to_string(),
            period: request.period,
            summary,
            comparison,
        })
    }

    fn compare(aligned: &AlignedPair, request: &AnalysisRequest) -> Result<BenchmarkComparison> {
        let fund = aligned.fund();
        let benchmark = aligned.benchmark();
        debug!("Comparing over {} aligned dates", aligned.len());

        let normalized = normalize_pair(aligned)?;

        let fund_daily = daily_returns(fund)?;
        let benchmark_daily = daily_returns(benchmark)?;
        let fund_volatility =
            rolling_volatility(&fund_daily, request.volatility_window, request.periods_per_year)?;
        let benchmark_volatility = rolling_volatility(
            &benchmark_daily,
            request.volatility_window,
            request.periods_per_year,
        )?;
        let fund_drawdown = drawdown(fund)?;
        let benchmark_drawdown = drawdown(benchmark)?;

        let stats = vec![
            ComparisonStat::new(
                "Total Return",
                allow_short(total_return(fund))?,
                allow_short(total_return(benchmark))?,
            ),
            ComparisonStat::new(
                "Average Volatility",
                mean_defined(&fund_volatility),
                mean_defined(&benchmark_volatility),
            ),
            ComparisonStat::new(
                "Max Drawdown",
                Some(max_drawdown(fund)?),
                Some(max_drawdown(benchmark)?),
            ),
            ComparisonStat::new(
                "Current Drawdown",
                Some(current_drawdown(fund)?),
                Some(current_drawdown(benchmark)?),
            ),
        ];

        let mut rolling = Vec::with_capacity(request.rolling_windows.len());
        for &window in &request.rolling_windows {
            let fund_rolling = rolling_return(fund, window.periods())?;
            let benchmark_rolling = rolling_return(benchmark, window.periods())?;
            let stats = match outperformance(&fund_rolling, &benchmark_rolling) {
                Ok(stats) => Some(stats),
                Err(AnalyticsError::InsufficientData(reason)) => {
                    debug!("No {} rolling comparison: {}", window, reason);
                    None
                }
                Err(e) => return Err(e),
            };
            rolling.push(RollingComparison {
                window,
                fund: fund_rolling,
                benchmark: benchmark_rolling,
                outperformance: stats,
            });
        }

        Ok(BenchmarkComparison {
            benchmark_name: benchmark.name().to_string(),
            normalized,
            stats,
            fund_volatility,
            benchmark_volatility,
            fund_drawdown,
            benchmark_drawdown,
            rolling,
        })
    }
}

/// Treat "not enough history" as an undefined value.
fn allow_short(result: Result<f64>) -> Result<Option<f64>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(AnalyticsError::InsufficientData(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;
    use chrono::{Duration, NaiveDate};

    fn series(name: &str, start: NaiveDate, values: impl IntoIterator<Item = f64>) -> TimeSeries {
        TimeSeries::new(
            name,
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| PricePoint::new(start + Duration::days(i as i64), v))
                .collect(),
        )
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    #[test]
    fn test_run_small_scenario() {
        let fund = series("Fund", start(), [10.0, 11.0, 9.0, 12.0]);
        let bench = series("Index", start(), [100.0, 105.0, 95.0, 110.0]);

        let report = FundAnalysis::run(&fund, &bench, &AnalysisRequest::default()).unwrap();
        let comparison = report.comparison.unwrap();

        assert_eq!(report.fund_name, "Fund");
        assert_eq!(comparison.benchmark_name, "Index");
        assert_eq!(comparison.normalized.fund().values()[0], 100.0);

        let total = comparison.stat("Total Return").unwrap();
        assert!((total.fund_value.unwrap() - 20.0).abs() < 1e-10);
        assert!((total.benchmark_value.unwrap() - 10.0).abs() < 1e-10);
        assert!((total.difference.unwrap() - 10.0).abs() < 1e-10);

        let max_dd = comparison.stat("Max Drawdown").unwrap();
        assert!((max_dd.fund_value.unwrap() - (-18.181818181)).abs() < 1e-6);

        // Not enough history for a 30-return volatility window.
        let vol = comparison.stat("Average Volatility").unwrap();
        assert_eq!(vol.fund_value, None);
        assert_eq!(vol.difference, None);
        assert_eq!(comparison.fund_volatility.defined_count(), 0);

        assert_eq!(comparison.rolling.len(), 3);
        assert!(comparison.rolling.iter().all(|r| r.outperformance.is_none()));
    }

    #[test]
    fn test_run_no_overlap_yields_no_comparison() {
        let fund = series("Fund", start(), [10.0, 11.0, 12.0]);
        let bench = series("Index", start() + Duration::days(400), [100.0, 101.0]);

        let report = FundAnalysis::run(&fund, &bench, &AnalysisRequest::default()).unwrap();
        assert!(report.comparison.is_none());
        assert!((report.summary.total.unwrap() - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_run_empty_fund_fails() {
        let fund = TimeSeries::new("Fund", vec![]);
        let bench = series("Index", start(), [100.0]);

        assert!(matches!(
            FundAnalysis::run(&fund, &bench, &AnalysisRequest::default()),
            Err(AnalyticsError::DegenerateSeries(_))
        ));
    }

    #[test]
    fn test_period_restricts_both_sides() {
        let fund = series("Fund", start(), (0..400).map(|i| 100.0 + i as f64));
        let bench = series("Index", start(), (0..500).map(|i| 200.0 + i as f64));

        let request = AnalysisRequest::default().with_period(TimePeriod::OneMonth);
        let report = FundAnalysis::run(&fund, &bench, &request).unwrap();
        let comparison = report.comparison.unwrap();

        assert_eq!(comparison.normalized.len(), 31);
        assert_eq!(
            comparison.normalized.benchmark().last().unwrap().date(),
            fund.last().unwrap().date()
        );
        // Summary still covers the full history.
        assert_eq!(report.summary.first_date, start());
    }

    #[test]
    fn test_rolling_windows_with_enough_history() {
        let fund = series("Fund", start(), (0..200).map(|i| 100.0 * 1.002_f64.powi(i)));
        let bench = series("Index", start(), (0..200).map(|i| 100.0 * 1.001_f64.powi(i)));

        let request = AnalysisRequest::default().with_period(TimePeriod::AllTime);
        let comparison = FundAnalysis::run(&fund, &bench, &request)
            .unwrap()
            .comparison
            .unwrap();

        let one_month = &comparison.rolling[0];
        assert_eq!(one_month.window, RollingWindow::OneMonth);
        let stats = one_month.outperformance.unwrap();
        assert_eq!(stats.periods, 170);
        assert_eq!(stats.pct_periods_outperformed, 100.0);

        let six_month = &comparison.rolling[2];
        assert_eq!(six_month.outperformance.unwrap().periods, 20);

        let vol = comparison.stat("Average Volatility").unwrap();
        assert!(vol.fund_value.is_some());
    }
}
