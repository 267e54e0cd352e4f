//! navscope - Mutual fund NAV analytics against a benchmark index.
//!
//! # Overview
//!
//! navscope turns a fund's NAV history and a benchmark's closing prices into
//! comparable performance and risk figures:
//!
//! - **Alignment**: both series reduced to their common trading dates
//! - **Normalization**: both curves rebased to 100 on the first common date
//! - **Returns**: 1-day, 1-week, 1-month, 1-year and total returns, plus
//!   rolling 1/3/6-month returns
//! - **Risk**: annualized rolling volatility, running drawdown, max and
//!   current drawdown
//! - **Outperformance**: how often and by how much the fund beat the index
//! - **Report hand-off**: aligned daily returns for an external tear-sheet tool
//!
//! Undefined values (a window that is not yet full, a horizon longer than the
//! history) are `None`, never zero.
//!
//! # Quick Start
//!
//! ```
//! use chrono::{Duration, NaiveDate};
//! use navscope::{AnalysisRequest, FundAnalysis, PricePoint, TimeSeries};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series = |name: &str, values: &[f64]| {
//!     TimeSeries::new(
//!         name,
//!         values
//!             .iter()
//!             .enumerate()
//!             .map(|(i, v)| PricePoint::new(start + Duration::days(i as i64), *v))
//!             .collect(),
//!     )
//! };
//!
//! let fund = series("Flexi Cap Fund", &[10.0, 11.0, 9.0, 12.0]);
//! let index = series("BSE 500 Index", &[100.0, 105.0, 95.0, 110.0]);
//!
//! let report = FundAnalysis::run(&fund, &index, &AnalysisRequest::default()).unwrap();
//! let comparison = report.comparison.unwrap();
//! let total = comparison.stat("Total Return").unwrap();
//!
//! assert!((total.fund_value.unwrap() - 20.0).abs() < 1e-9);
//! assert!((total.benchmark_value.unwrap() - 10.0).abs() < 1e-9);
//! ```
//!
//! # Modules
//!
//! - [`types`]: Core data types (PricePoint, TimeSeries, ReturnSeries)
//! - [`align`]: Date alignment of fund and benchmark
//! - [`normalize`]: Rebasing to 100
//! - [`returns`]: Horizon and rolling returns
//! - [`risk`]: Volatility and drawdown
//! - [`outperformance`]: Win rate and average excess return
//! - [`report`]: Tear-sheet hand-off
//! - [`analysis`]: End-to-end analysis of one fund
//! - [`analytics`]: Terminal, JSON and CSV reporting
//! - [`payload`]: Catalog, fund detail and benchmark parsing
//! - [`period`]: Lookback periods
//! - [`cache`]: TTL cache for fetched payloads
//! - [`export`]: CSV and JSON export
//! - [`viz`]: Sparklines and histograms
//! - [`config`]: TOML configuration file support

pub mod align;
pub mod analysis;
pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod normalize;
pub mod outperformance;
pub mod payload;
pub mod period;
pub mod report;
pub mod returns;
pub mod risk;
pub mod types;
pub mod viz;

// Re-exports for convenience
pub use align::{align, align_returns, align_series, AlignedPair};
pub use analysis::{AnalysisReport, AnalysisRequest, BenchmarkComparison, FundAnalysis};
pub use analytics::ResultFormatter;
pub use error::{AnalyticsError, Result};
pub use normalize::{normalize, normalize_pair};
pub use outperformance::{outperformance, rolling_outperformance, Outperformance};
pub use period::TimePeriod;
pub use report::{prepare_report_input, render_report, CsvHandoff, ReportInput, TearsheetGenerator};
pub use returns::{
    fixed_horizon_return, horizon_return, previous_return, rolling_return, total_return, Horizon,
    ReturnsSummary, RollingWindow,
};
pub use risk::{current_drawdown, daily_returns, drawdown, max_drawdown, rolling_volatility};
pub use types::{ComparisonStat, PricePoint, ReturnPoint, ReturnSeries, TimeSeries};

// Payload parsing
pub use payload::{
    benchmark_query_range, load_benchmark_csv, load_catalog, load_fund_detail, parse_benchmark_csv,
    parse_benchmark_json, parse_catalog, parse_fund_detail, search_catalog, FundCatalogEntry,
    FundDetail, FundMeta, LoadOptions,
};

// Caching
pub use cache::{CacheKey, CachedPayload, Endpoint, TtlCache};

// Configuration
pub use config::AnalyzerFileConfig;

// Visualization utilities
pub use viz::{pair_sparklines, sparkline, sparkline_with_config, SparklineConfig};
