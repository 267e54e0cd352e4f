//! Parsing of fund catalog, fund detail and benchmark payloads.
//!
//! Collaborator payloads are validated here, before any series enters the
//! analytics functions. Rows with an unparseable date, an unparseable value
//! or a non-positive price are skipped (and counted) or rejected depending
//! on [`LoadOptions::skip_invalid`].

use crate::error::{AnalyticsError, Result};
use crate::types::{PricePoint, TimeSeries};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Date format used by the fund NAV API (`DD-MM-YYYY`).
pub const NAV_DATE_FORMAT: &str = "%d-%m-%Y";

/// Options controlling payload validation.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Skip invalid rows instead of failing.
    pub skip_invalid: bool,
    /// Explicit date format for benchmark rows. Common formats are tried when unset.
    pub date_format: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            skip_invalid: true,
            date_format: None,
        }
    }
}

/// One entry of the fund catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundCatalogEntry {
    #[serde(rename = "schemeName")]
    pub scheme_name: String,
    #[serde(rename = "schemeCode")]
    pub scheme_code: u64,
}

/// Scheme metadata attached to a fund detail payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundMeta {
    #[serde(default)]
    pub fund_house: Option<String>,
    #[serde(default)]
    pub scheme_type: Option<String>,
    #[serde(default)]
    pub scheme_category: Option<String>,
    #[serde(default)]
    pub scheme_code: Option<u64>,
    #[serde(default)]
    pub scheme_name: Option<String>,
    #[serde(default)]
    pub isin_growth: Option<String>,
    #[serde(default)]
    pub isin_div_reinvestment: Option<String>,
}

impl FundMeta {
    /// Label/value pairs for display, with "N/A" for missing fields.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        fn or_na(v: &Option<String>) -> String {
            v.as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or("N/A")
                .to_string()
        }

        vec![
            ("Fund House", or_na(&self.fund_house)),
            ("Scheme Type", or_na(&self.scheme_type)),
            ("Scheme Category", or_na(&self.scheme_category)),
            (
                "Scheme Code",
                self.scheme_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            ("Scheme Name", or_na(&self.scheme_name)),
            ("ISIN (Growth)", or_na(&self.isin_growth)),
            ("ISIN (Dividend Reinvestment)", or_na(&self.isin_div_reinvestment)),
        ]
    }
}

/// One NAV record as delivered by the API: both fields are strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavRecord {
    pub date: String,
    pub nav: String,
}

/// Fund detail payload: metadata plus NAV history (newest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundDetail {
    #[serde(default)]
    pub meta: FundMeta,
    #[serde(default)]
    pub data: Vec<NavRecord>,
}

impl FundDetail {
    /// Display name of the scheme.
    pub fn name(&self) -> &str {
        self.meta
            .scheme_name
            .as_deref()
            .unwrap_or("Unknown Fund")
    }

    /// Parse the NAV history into an ascending [`TimeSeries`].
    pub fn to_series(&self, options: &LoadOptions) -> Result<TimeSeries> {
        let mut points = Vec::with_capacity(self.data.len());
        let mut skipped = 0;

        for (row_num, record) in self.data.iter().enumerate() {
            match parse_nav_record(record) {
                Ok(point) => points.push(point),
                Err(e) => {
                    if options.skip_invalid {
                        debug!("Skipping NAV row {}: {}", row_num + 1, e);
                        skipped += 1;
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        if skipped > 0 {
            warn!("Skipped {} invalid NAV rows for {}", skipped, self.name());
        }

        Ok(TimeSeries::new(self.name(), points))
    }
}

fn parse_nav_record(record: &NavRecord) -> Result<PricePoint> {
    let date = NaiveDate::parse_from_str(record.date.trim(), NAV_DATE_FORMAT)?;
    let nav: f64 = record.nav.trim().parse().map_err(|_| {
        AnalyticsError::DataError(format!("invalid NAV '{}' on {}", record.nav, record.date))
    })?;
    validated(date, nav)
}

fn validated(date: NaiveDate, value: f64) -> Result<PricePoint> {
    let point = PricePoint::new(date, value);
    if point.is_valid() {
        Ok(point)
    } else {
        Err(AnalyticsError::DataError(format!(
            "non-positive or non-finite value {} on {}",
            value, date
        )))
    }
}

/// Parse a fund catalog JSON array.
pub fn parse_catalog(json: &str) -> Result<Vec<FundCatalogEntry>> {
    Ok(serde_json::from_str(json)?)
}

/// Load a fund catalog from a JSON file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<FundCatalogEntry>> {
    let path = path.as_ref();
    info!("Loading fund catalog from: {}", path.display());
    parse_catalog(&fs::read_to_string(path)?)
}

/// Parse a fund detail JSON object.
pub fn parse_fund_detail(json: &str) -> Result<FundDetail> {
    Ok(serde_json::from_str(json)?)
}

/// Load a fund detail payload from a JSON file.
pub fn load_fund_detail(path: impl AsRef<Path>) -> Result<FundDetail> {
    let path = path.as_ref();
    info!("Loading fund details from: {}", path.display());
    parse_fund_detail(&fs::read_to_string(path)?)
}

/// Case-insensitive substring search over scheme names.
///
/// A blank search term matches nothing.
pub fn search_catalog<'a>(entries: &'a [FundCatalogEntry], term: &str) -> Vec<&'a FundCatalogEntry> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    entries
        .iter()
        .filter(|e| e.scheme_name.to_lowercase().contains(&needle))
        .collect()
}

/// Date range to request from the benchmark provider.
///
/// The provider treats the end date as exclusive, so one day is added to
/// include `end` itself.
pub fn benchmark_query_range(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    (start, end + Duration::days(1))
}

fn de_price<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(v) => Ok(Some(v)),
        Raw::Text(s) if s.trim().is_empty() => Ok(None),
        Raw::Text(s) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        Raw::Null => Ok(None),
    }
}

/// One benchmark observation.
///
/// `close` is preferred; `adj_close` is used when a file only carries
/// adjusted closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    #[serde(alias = "Date", alias = "DATE", alias = "Datetime", alias = "timestamp")]
    pub date: String,
    #[serde(alias = "Close", alias = "CLOSE", default, deserialize_with = "de_price")]
    pub close: Option<f64>,
    #[serde(
        rename = "adj_close",
        alias = "Adj Close",
        default,
        deserialize_with = "de_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub adj_close: Option<f64>,
}

impl BenchmarkRecord {
    pub fn price(&self) -> Option<f64> {
        self.close.or(self.adj_close)
    }
}

fn parse_benchmark_date(s: &str, format: Option<&str>) -> Result<NaiveDate> {
    let s = s.trim();
    if let Some(fmt) = format {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%z",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%SZ",
    ];
    for fmt in &datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", NAV_DATE_FORMAT, "%d/%m/%Y"];
    for fmt in &date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }

    // Timestamps with an offset or fractional part: keep the date prefix.
    if s.len() > 10 && s.is_char_boundary(10) {
        if let Ok(d) = NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d") {
            return Ok(d);
        }
    }

    Err(AnalyticsError::DataError(format!(
        "unable to parse benchmark date: {}",
        s
    )))
}

/// Convert benchmark records into a named series.
pub fn benchmark_from_records(
    name: &str,
    records: &[BenchmarkRecord],
    options: &LoadOptions,
) -> Result<TimeSeries> {
    let mut points = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for (row_num, record) in records.iter().enumerate() {
        let point = parse_benchmark_date(&record.date, options.date_format.as_deref())
            .and_then(|date| {
                let close = record.price().ok_or_else(|| {
                    AnalyticsError::DataError(format!("no close price on {}", record.date))
                })?;
                validated(date, close)
            });
        match point {
            Ok(p) => points.push(p),
            Err(e) => {
                if options.skip_invalid {
                    debug!("Skipping benchmark row {}: {}", row_num + 1, e);
                    skipped += 1;
                } else {
                    return Err(e);
                }
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} invalid benchmark rows for {}", skipped, name);
    }

    Ok(TimeSeries::new(name, points))
}

/// Parse benchmark records from CSV text read from `reader`.
pub fn parse_benchmark_csv<R: Read>(
    name: &str,
    reader: R,
    options: &LoadOptions,
) -> Result<TimeSeries> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (row_num, result) in reader.deserialize::<BenchmarkRecord>().enumerate() {
        match result {
            Ok(r) => records.push(r),
            Err(e) => {
                if options.skip_invalid {
                    debug!("Skipping benchmark CSV row {}: {}", row_num + 1, e);
                } else {
                    return Err(AnalyticsError::CsvError(e));
                }
            }
        }
    }

    benchmark_from_records(name, &records, options)
}

/// Load benchmark close prices from a CSV file.
pub fn load_benchmark_csv(
    name: &str,
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<TimeSeries> {
    let path = path.as_ref();
    info!("Loading benchmark data from: {}", path.display());
    let file = fs::File::open(path)?;
    parse_benchmark_csv(name, file, options)
}

/// Parse benchmark records from a JSON array of `{date, close}` objects.
pub fn parse_benchmark_json(name: &str, json: &str, options: &LoadOptions) -> Result<TimeSeries> {
    let records: Vec<BenchmarkRecord> = serde_json::from_str(json)?;
    benchmark_from_records(name, &records, options)
}

/// Load a benchmark file, choosing the parser from the extension.
pub fn load_benchmark(name: &str, path: impl AsRef<Path>, options: &LoadOptions) -> Result<TimeSeries> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        info!("Loading benchmark data from: {}", path.display());
        parse_benchmark_json(name, &fs::read_to_string(path)?, options)
    } else {
        load_benchmark_csv(name, path, options)
    }
}
