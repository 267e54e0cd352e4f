//! Error types for the analytics library.

use thiserror::Error;

/// Main error type for NAV and benchmark analytics.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Degenerate series: {0}")]
    DegenerateSeries(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Series share no common dates")]
    AlignmentEmpty,

    #[error("Data error: {0}")]
    DataError(String),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParseError(#[from] chrono::ParseError),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
