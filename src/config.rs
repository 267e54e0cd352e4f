//! Configuration file support for fund analysis.
//!
//! Allows loading analysis settings from TOML files so that runs are
//! reproducible.

use crate::analysis::AnalysisRequest;
use crate::cache::Endpoint;
use crate::error::{AnalyticsError, Result};
use crate::export::{validate_date_format, ExportConfig};
use crate::payload::LoadOptions;
use crate::period::TimePeriod;
use crate::returns::RollingWindow;
use crate::risk::{DEFAULT_VOLATILITY_WINDOW, TRADING_DAYS_PER_YEAR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Complete analyzer configuration loaded from a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerFileConfig {
    /// Benchmark index settings.
    #[serde(default)]
    pub benchmark: BenchmarkSettings,
    /// Analysis parameters.
    #[serde(default)]
    pub analysis: AnalysisSettings,
    /// Payload cache lifetimes.
    #[serde(default)]
    pub cache: CacheSettings,
    /// Input validation settings.
    #[serde(default)]
    pub data: DataSettings,
    /// Export formatting.
    #[serde(default)]
    pub export: ExportSettings,
}

/// Benchmark index settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSettings {
    /// Display name.
    #[serde(default = "default_benchmark_name")]
    pub name: String,
    /// Local CSV or JSON file with benchmark closes.
    pub path: Option<String>,
}

fn default_benchmark_name() -> String { "BSE 500 Index".to_string() }

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            name: default_benchmark_name(),
            path: None,
        }
    }
}

/// Analysis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Lookback period code: 1m, 3m, 6m, 1y, 3y, 5y or all.
    #[serde(default = "default_period")]
    pub period: String,
    /// Rolling volatility window, in daily returns.
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,
    /// Annualization factor for volatility.
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
    /// Rolling-return windows, in observations (30, 90 or 180).
    #[serde(default = "default_rolling_windows")]
    pub rolling_windows: Vec<usize>,
}

fn default_period() -> String { "1y".to_string() }
fn default_volatility_window() -> usize { DEFAULT_VOLATILITY_WINDOW }
fn default_periods_per_year() -> f64 { TRADING_DAYS_PER_YEAR }
fn default_rolling_windows() -> Vec<usize> {
    RollingWindow::ALL.iter().map(|w| w.periods()).collect()
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            period: default_period(),
            volatility_window: default_volatility_window(),
            periods_per_year: default_periods_per_year(),
            rolling_windows: default_rolling_windows(),
        }
    }
}

/// Payload cache lifetimes, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_catalog_ttl")]
    pub catalog_ttl_secs: u64,
    #[serde(default = "default_detail_ttl")]
    pub detail_ttl_secs: u64,
    #[serde(default = "default_benchmark_ttl")]
    pub benchmark_ttl_secs: u64,
}

fn default_catalog_ttl() -> u64 { 3600 }
fn default_detail_ttl() -> u64 { 1800 }
fn default_benchmark_ttl() -> u64 { 3600 }

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            catalog_ttl_secs: default_catalog_ttl(),
            detail_ttl_secs: default_detail_ttl(),
            benchmark_ttl_secs: default_benchmark_ttl(),
        }
    }
}

/// Input validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    /// Skip unparseable or non-positive rows instead of failing.
    #[serde(default = "default_true")]
    pub skip_invalid: bool,
    /// Date format of benchmark files.
    pub date_format: Option<String>,
}

fn default_true() -> bool { true }

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            skip_invalid: true,
            date_format: None,
        }
    }
}

/// Export formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_precision")]
    pub precision: usize,
}

fn default_date_format() -> String { "%Y-%m-%d".to_string() }
fn default_precision() -> usize { 4 }

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            precision: default_precision(),
        }
    }
}

impl AnalyzerFileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = fs::read_to_string(path)?;
        let config: AnalyzerFileConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        self.to_request()?;
        validate_date_format(&self.export.date_format)?;
        if let Some(format) = &self.data.date_format {
            validate_date_format(format)?;
        }
        Ok(())
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AnalyticsError::ConfigError(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Convert to an [`AnalysisRequest`], validating every parameter.
    pub fn to_request(&self) -> Result<AnalysisRequest> {
        let period: TimePeriod = self
            .analysis
            .period
            .parse()
            .map_err(|e: AnalyticsError| AnalyticsError::ConfigError(e.to_string()))?;

        let rolling_windows = self
            .analysis
            .rolling_windows
            .iter()
            .map(|&periods| {
                RollingWindow::from_periods(periods).ok_or_else(|| {
                    AnalyticsError::ConfigError(format!(
                        "unsupported rolling window {}, expected 30, 90 or 180",
                        periods
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if self.analysis.volatility_window < 2 {
            return Err(AnalyticsError::ConfigError(format!(
                "volatility_window must be at least 2, got {}",
                self.analysis.volatility_window
            )));
        }
        if self.analysis.periods_per_year <= 0.0 || !self.analysis.periods_per_year.is_finite() {
            return Err(AnalyticsError::ConfigError(format!(
                "periods_per_year must be positive, got {}",
                self.analysis.periods_per_year
            )));
        }

        Ok(AnalysisRequest {
            period,
            rolling_windows,
            volatility_window: self.analysis.volatility_window,
            periods_per_year: self.analysis.periods_per_year,
        })
    }

    /// Time-to-live for cached payloads of `endpoint`.
    pub fn cache_ttl(&self, endpoint: Endpoint) -> Duration {
        let secs = match endpoint {
            Endpoint::Catalog => self.cache.catalog_ttl_secs,
            Endpoint::FundDetail => self.cache.detail_ttl_secs,
            Endpoint::Benchmark => self.cache.benchmark_ttl_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            skip_invalid: self.data.skip_invalid,
            date_format: self.data.date_format.clone(),
        }
    }

    pub fn export_config(&self) -> Result<ExportConfig> {
        validate_date_format(&self.export.date_format)?;
        Ok(ExportConfig {
            date_format: self.export.date_format.clone(),
            precision: self.export.precision,
            ..Default::default()
        })
    }

    /// Generate an example configuration file content.
    pub fn example() -> String {
        r#"# navscope configuration file

[benchmark]
name = "BSE 500 Index"
# path = "data/bse500.csv"

[analysis]
period = "1y"              # 1m, 3m, 6m, 1y, 3y, 5y, all
volatility_window = 30     # daily returns
periods_per_year = 252.0
rolling_windows = [30, 90, 180]

[cache]
catalog_ttl_secs = 3600
detail_ttl_secs = 1800
benchmark_ttl_secs = 3600

[data]
skip_invalid = true
# date_format = "%Y-%m-%d"

[export]
date_format = "%Y-%m-%d"
precision = 4
"#
        .to_string()
    }
}
