//! Hand-off of aligned daily returns to an external tear-sheet generator.
//!
//! This module never computes report content. It prepares two equal-length
//! daily-return series and passes them, with display names, to a
//! [`TearsheetGenerator`], returning whatever bytes the generator produces.

use crate::align::align_series;
use crate::error::{AnalyticsError, Result};
use crate::risk::daily_returns;
use crate::types::{ReturnSeries, TimeSeries};
use serde::Serialize;
use tracing::debug;

/// Aligned daily returns for fund and benchmark, first (undefined) row dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportInput {
    pub fund_name: String,
    pub benchmark_name: String,
    pub fund_returns: ReturnSeries,
    pub benchmark_returns: ReturnSeries,
}

impl ReportInput {
    /// Number of return rows on each side.
    pub fn len(&self) -> usize {
        self.fund_returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fund_returns.is_empty()
    }

    /// Rows as `(date, fund_pct, benchmark_pct)`.
    pub fn rows(&self) -> impl Iterator<Item = (chrono::NaiveDate, f64, f64)> + '_ {
        self.fund_returns
            .defined()
            .zip(self.benchmark_returns.defined())
            .map(|((date, f), (_, b))| (date, f, b))
    }
}

/// Align two price series and compute their daily returns for reporting.
pub fn prepare_report_input(fund: &TimeSeries, benchmark: &TimeSeries) -> Result<ReportInput> {
    let pair = align_series(fund, benchmark).require_overlap()?;
    if pair.len() < 2 {
        return Err(AnalyticsError::InsufficientData(format!(
            "{} and {} share only {} date; daily returns need at least 2",
            fund.name(),
            benchmark.name(),
            pair.len()
        )));
    }

    let fund_returns = daily_returns(pair.fund())?.skip(1);
    let benchmark_returns = daily_returns(pair.benchmark())?.skip(1);
    debug_assert_eq!(fund_returns.len(), benchmark_returns.len());
    debug!(
        "Prepared {} aligned daily returns for {} vs {}",
        fund_returns.len(),
        fund.name(),
        benchmark.name()
    );

    Ok(ReportInput {
        fund_name: fund.name().to_string(),
        benchmark_name: benchmark.name().to_string(),
        fund_returns,
        benchmark_returns,
    })
}

/// External producer of a tear-sheet document.
pub trait TearsheetGenerator {
    /// Render a report for the given input. The bytes are opaque to the caller.
    fn generate(&self, input: &ReportInput) -> Result<Vec<u8>>;
}

/// Prepare the input and forward it to `generator`, untouched.
pub fn render_report<G: TearsheetGenerator + ?Sized>(
    generator: &G,
    fund: &TimeSeries,
    benchmark: &TimeSeries,
) -> Result<Vec<u8>> {
    let input = prepare_report_input(fund, benchmark)?;
    generator.generate(&input)
}

/// Unit of the returns written by [`CsvHandoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnScale {
    /// Decimal fractions (0.01 for 1%), as tear-sheet libraries expect.
    #[default]
    Fraction,
    /// Percent values as computed by this crate.
    Percent,
}

/// Serializes the report input as CSV (`date,<fund>,<benchmark>`) in memory.
#[derive(Debug, Clone, Default)]
pub struct CsvHandoff {
    pub scale: ReturnScale,
}

impl CsvHandoff {
    pub fn new(scale: ReturnScale) -> Self {
        Self { scale }
    }
}

impl TearsheetGenerator for CsvHandoff {
    fn generate(&self, input: &ReportInput) -> Result<Vec<u8>> {
        let factor = match self.scale {
            ReturnScale::Fraction => 0.01,
            ReturnScale::Percent => 1.0,
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["date", input.fund_name.as_str(), input.benchmark_name.as_str()])?;
        for (date, f, b) in input.rows() {
            writer.write_record([
                date.format("%Y-%m-%d").to_string(),
                (f * factor).to_string(),
                (b * factor).to_string(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| AnalyticsError::IoError(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn series(name: &str, raw: &[(u32, f64)]) -> TimeSeries {
        TimeSeries::new(
            name,
            raw.iter().map(|&(day, v)| PricePoint::new(d(day), v)).collect(),
        )
    }

    #[test]
    fn test_prepare_report_input() {
        let fund = series("Fund", &[(1, 10.0), (2, 11.0), (3, 9.9), (6, 12.0)]);
        let bench = series("Index", &[(1, 100.0), (2, 105.0), (3, 100.0), (4, 101.0)]);

        let input = prepare_report_input(&fund, &bench).unwrap();

        assert_eq!(input.len(), 2);
        assert_eq!(input.fund_returns.len(), input.benchmark_returns.len());
        assert_eq!(input.fund_returns.defined_count(), 2);
        assert_eq!(input.fund_name, "Fund");
        assert_eq!(input.benchmark_name, "Index");

        let rows: Vec<_> = input.rows().collect();
        assert_eq!(rows[0].0, d(2));
        assert!((rows[0].1 - 10.0).abs() < 1e-10);
        assert!((rows[0].2 - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_prepare_report_input_no_overlap() {
        let fund = series("Fund", &[(1, 10.0), (2, 11.0)]);
        let bench = series("Index", &[(3, 100.0), (4, 105.0)]);

        assert!(matches!(
            prepare_report_input(&fund, &bench),
            Err(AnalyticsError::AlignmentEmpty)
        ));
    }

    #[test]
    fn test_prepare_report_input_single_common_date() {
        let fund = series("Fund", &[(1, 10.0), (2, 11.0)]);
        let bench = series("Index", &[(2, 100.0), (4, 105.0)]);

        assert!(matches!(
            prepare_report_input(&fund, &bench),
            Err(AnalyticsError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_csv_handoff_fractions() {
        let fund = series("Fund", &[(1, 10.0), (2, 11.0)]);
        let bench = series("Index", &[(1, 100.0), (2, 105.0)]);

        let bytes = render_report(&CsvHandoff::default(), &fund, &bench).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("date,Fund,Index"));
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(row[0], "2024-05-02");
        assert!((row[1].parse::<f64>().unwrap() - 0.1).abs() < 1e-10);
        assert!((row[2].parse::<f64>().unwrap() - 0.05).abs() < 1e-10);
        assert!(lines.next().is_none());
    }

    struct Echo;

    impl TearsheetGenerator for Echo {
        fn generate(&self, input: &ReportInput) -> Result<Vec<u8>> {
            Ok(format!("{}|{}|{}", input.fund_name, input.benchmark_name, input.len()).into_bytes())
        }
    }

    #[test]
    fn test_render_report_passes_bytes_through() {
        let fund = series("Fund", &[(1, 10.0), (2, 11.0), (3, 12.0)]);
        let bench = series("Index", &[(1, 100.0), (2, 105.0), (3, 110.0)]);

        let bytes = render_report(&Echo, &fund, &bench).unwrap();
        assert_eq!(bytes, b"Fund|Index|2".to_vec());
    }
}
