//! Export utilities for NAV series and analysis results.
//!
//! This module writes:
//! - Price series (`date,value`)
//! - Aligned fund and benchmark pairs (`date,<fund>,<benchmark>`)
//! - Derived return series, with undefined values left empty
//! - Full comparison tables and JSON reports
//!
//! # Example
//!
//! ```ignore
//! use navscope::export::{export_aligned_csv, export_series_csv};
//!
//! export_series_csv(&fund, "nav.csv")?;
//! export_aligned_csv(&comparison.normalized, "normalized.csv")?;
//! ```

use crate::align::AlignedPair;
use crate::analysis::{AnalysisReport, BenchmarkComparison};
use crate::error::{AnalyticsError, Result};
use crate::types::{ReturnSeries, TimeSeries};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Configuration for exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Date format for CSV exports.
    pub date_format: String,
    /// Decimal precision for numeric values.
    pub precision: usize,
    /// Whether to include headers in CSV.
    pub include_headers: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            precision: 4,
            include_headers: true,
        }
    }
}

/// CSV writer parameterized by an [`ExportConfig`].
#[derive(Debug, Clone, Default)]
pub struct SeriesExporter {
    config: ExportConfig,
}

impl SeriesExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn date(&self, date: NaiveDate) -> Result<String> {
        use std::fmt::Write as _;

        let mut out = String::new();
        write!(out, "{}", date.format(&self.config.date_format))
            .map_err(|_| invalid_date_format(&self.config.date_format))?;
        Ok(out)
    }

    fn num(&self, value: f64) -> String {
        format!("{:.prec$}", value, prec = self.config.precision)
    }

    fn opt(&self, value: Option<f64>) -> String {
        value.map(|v| self.num(v)).unwrap_or_default()
    }

    /// Write a price series as `date,value`.
    pub fn write_series<W: Write>(&self, series: &TimeSeries, writer: &mut W) -> Result<()> {
        if self.config.include_headers {
            writeln!(writer, "date,value")?;
        }
        for point in series.points() {
            writeln!(writer, "{},{}", self.date(point.date())?, self.num(point.value()))?;
        }
        Ok(())
    }

    /// Write an aligned pair as `date,<fund>,<benchmark>`.
    pub fn write_aligned<W: Write>(&self, pair: &AlignedPair, writer: &mut W) -> Result<()> {
        if self.config.include_headers {
            writeln!(
                writer,
                "date,{},{}",
                csv_field(pair.fund().name()),
                csv_field(pair.benchmark().name())
            )?;
        }
        for (f, b) in pair.fund().points().iter().zip(pair.benchmark().points()) {
            writeln!(
                writer,
                "{},{},{}",
                self.date(f.date())?,
                self.num(f.value()),
                self.num(b.value())
            )?;
        }
        Ok(())
    }

    /// Write a return series as `date,value`; undefined values are empty.
    pub fn write_returns<W: Write>(&self, returns: &ReturnSeries, writer: &mut W) -> Result<()> {
        if self.config.include_headers {
            writeln!(writer, "date,value")?;
        }
        for point in returns.points() {
            writeln!(writer, "{},{}", self.date(point.date)?, self.opt(point.value))?;
        }
        Ok(())
    }

    /// Write every per-date series of a comparison side by side.
    pub fn write_comparison<W: Write>(
        &self,
        comparison: &BenchmarkComparison,
        writer: &mut W,
    ) -> Result<()> {
        let mut header = vec![
            "date".to_string(),
            "fund_normalized".to_string(),
            "benchmark_normalized".to_string(),
            "fund_volatility".to_string(),
            "benchmark_volatility".to_string(),
            "fund_drawdown".to_string(),
            "benchmark_drawdown".to_string(),
        ];
        for rolling in &comparison.rolling {
            let periods = rolling.window.periods();
            header.push(format!("fund_rolling_{}", periods));
            header.push(format!("benchmark_rolling_{}", periods));
        }
        if self.config.include_headers {
            writeln!(writer, "{}", header.join(","))?;
        }

        let normalized = &comparison.normalized;
        for (i, (f, b)) in normalized
            .fund()
            .points()
            .iter()
            .zip(normalized.benchmark().points())
            .enumerate()
        {
            let at = |series: &ReturnSeries| series.points().get(i).and_then(|p| p.value);
            let mut row = vec![
                self.date(f.date())?,
                self.num(f.value()),
                self.num(b.value()),
                self.opt(at(&comparison.fund_volatility)),
                self.opt(at(&comparison.benchmark_volatility)),
                self.opt(at(&comparison.fund_drawdown)),
                self.opt(at(&comparison.benchmark_drawdown)),
            ];
            for rolling in &comparison.rolling {
                row.push(self.opt(at(&rolling.fund)));
                row.push(self.opt(at(&rolling.benchmark)));
            }
            writeln!(writer, "{}", row.join(","))?;
        }
        Ok(())
    }

    fn to_file<F>(&self, path: impl AsRef<Path>, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<()>,
    {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        write(&mut writer)?;
        writer.flush()?;
        info!("Exported {}", path.display());
        Ok(())
    }

    pub fn export_series(&self, series: &TimeSeries, path: impl AsRef<Path>) -> Result<()> {
        self.to_file(path, |w| self.write_series(series, w))
    }

    pub fn export_aligned(&self, pair: &AlignedPair, path: impl AsRef<Path>) -> Result<()> {
        self.to_file(path, |w| self.write_aligned(pair, w))
    }

    pub fn export_returns(&self, returns: &ReturnSeries, path: impl AsRef<Path>) -> Result<()> {
        self.to_file(path, |w| self.write_returns(returns, w))
    }

    pub fn export_comparison(
        &self,
        comparison: &BenchmarkComparison,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        self.to_file(path, |w| self.write_comparison(comparison, w))
    }
}

fn invalid_date_format(format: &str) -> AnalyticsError {
    AnalyticsError::ConfigError(format!("invalid date format '{}'", format))
}

/// Reject strftime patterns chrono cannot render.
pub fn validate_date_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid_date_format(format));
    }
    Ok(())
}

/// Quote a header field when it contains a delimiter or quote.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Export a price series to CSV with the default configuration.
pub fn export_series_csv(series: &TimeSeries, path: impl AsRef<Path>) -> Result<()> {
    SeriesExporter::default().export_series(series, path)
}

/// Render a price series as CSV text.
pub fn series_to_csv(series: &TimeSeries) -> Result<String> {
    let mut buf = Vec::new();
    SeriesExporter::default().write_series(series, &mut buf)?;
    String::from_utf8(buf).map_err(|e| AnalyticsError::DataError(e.to_string()))
}

/// Export an aligned pair to CSV with the default configuration.
pub fn export_aligned_csv(pair: &AlignedPair, path: impl AsRef<Path>) -> Result<()> {
    SeriesExporter::default().export_aligned(pair, path)
}

/// Export a return series to CSV with the default configuration.
pub fn export_returns_csv(returns: &ReturnSeries, path: impl AsRef<Path>) -> Result<()> {
    SeriesExporter::default().export_returns(returns, path)
}

/// Export an analysis report as pretty JSON.
pub fn export_report_json(report: &AnalysisReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    info!("Exported {}", path.display());
    Ok(())
}
