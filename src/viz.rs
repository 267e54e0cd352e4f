//! Terminal visualization of NAV and benchmark series.
//!
//! This module provides:
//! - ASCII sparklines for normalized price curves
//! - Shared-scale sparklines so fund and benchmark can be compared by eye
//! - A histogram of return distributions
//!
//! # Example
//!
//! ```
//! use navscope::viz::sparkline;
//!
//! let nav = vec![100.0, 102.0, 101.0, 105.0, 108.0, 107.0, 112.0];
//! let spark = sparkline(&nav, 7);
//! assert_eq!(spark.chars().count(), 7);
//! ```

use crate::align::AlignedPair;
use crate::types::ReturnSeries;

/// Characters used for sparkline rendering, ordered from low to high.
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Configuration for sparkline generation.
#[derive(Debug, Clone)]
pub struct SparklineConfig {
    /// Maximum width in characters.
    pub width: usize,
    /// Fixed lower bound; the data minimum when unset.
    pub min_value: Option<f64>,
    /// Fixed upper bound; the data maximum when unset.
    pub max_value: Option<f64>,
}

impl Default for SparklineConfig {
    fn default() -> Self {
        Self {
            width: 40,
            min_value: None,
            max_value: None,
        }
    }
}

/// Generate an ASCII sparkline from a slice of values.
pub fn sparkline(values: &[f64], width: usize) -> String {
    sparkline_with_config(
        values,
        &SparklineConfig {
            width,
            ..Default::default()
        },
    )
}

/// Generate an ASCII sparkline with custom configuration.
pub fn sparkline_with_config(values: &[f64], config: &SparklineConfig) -> String {
    if values.is_empty() || config.width == 0 {
        return String::new();
    }

    let sampled = downsample(values, config.width);

    let min_val = config
        .min_value
        .unwrap_or_else(|| sampled.iter().cloned().fold(f64::INFINITY, f64::min));
    let max_val = config
        .max_value
        .unwrap_or_else(|| sampled.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
    let range = max_val - min_val;

    sampled
        .iter()
        .map(|&val| {
            let normalized = if range > 0.0 {
                ((val - min_val) / range).clamp(0.0, 1.0)
            } else {
                0.5
            };
            SPARKLINE_CHARS[((normalized * 7.0).round() as usize).min(7)]
        })
        .collect()
}

/// Sparklines for both sides of a pair, drawn on one common scale.
pub fn pair_sparklines(pair: &AlignedPair, width: usize) -> (String, String) {
    let fund = pair.fund().values();
    let benchmark = pair.benchmark().values();

    let all = fund.iter().chain(benchmark.iter()).cloned();
    let (min_value, max_value) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let config = SparklineConfig {
        width,
        min_value: Some(min_value),
        max_value: Some(max_value),
    };

    (
        sparkline_with_config(&fund, &config),
        sparkline_with_config(&benchmark, &config),
    )
}

/// Downsample a slice of values to a target length using averaging.
fn downsample(values: &[f64], target_len: usize) -> Vec<f64> {
    if values.len() <= target_len {
        return values.to_vec();
    }

    let chunk_size = values.len() as f64 / target_len as f64;
    let mut result = Vec::with_capacity(target_len);

    for i in 0..target_len {
        let start = (i as f64 * chunk_size).floor() as usize;
        let end = (((i + 1) as f64 * chunk_size).ceil() as usize).min(values.len());

        if start < end {
            let sum: f64 = values[start..end].iter().sum();
            result.push(sum / (end - start) as f64);
        }
    }

    result
}

/// ASCII histogram of the defined values of a return series.
pub fn returns_histogram(returns: &ReturnSeries, width: usize) -> String {
    let data: Vec<f64> = returns.defined().map(|(_, v)| v).collect();
    histogram(&data, width, "%")
}

fn histogram(data: &[f64], width: usize, suffix: &str) -> String {
    const NUM_BINS: usize = 10;

    if data.is_empty() {
        return String::new();
    }

    let min_val = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_val = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max_val - min_val;

    if range <= 0.0 {
        return format!("  All values: {:.2}{}\n", min_val, suffix);
    }

    let bin_width = range / NUM_BINS as f64;
    let mut bins = [0usize; NUM_BINS];
    for &val in data {
        let bin_idx = (((val - min_val) / bin_width).floor() as usize).min(NUM_BINS - 1);
        bins[bin_idx] += 1;
    }

    let max_count = bins.iter().copied().max().unwrap_or(1).max(1);
    let mut output = String::new();

    for (i, &count) in bins.iter().enumerate() {
        let bin_start = min_val + i as f64 * bin_width;
        let bar_len = (count as f64 / max_count as f64 * width as f64) as usize;
        let percentage = count as f64 / data.len() as f64 * 100.0;

        output.push_str(&format!(
            "  {:>7.2}{} |{:<width$}| {:>5.1}%\n",
            bin_start,
            suffix,
            "█".repeat(bar_len),
            percentage,
            width = width
        ));
    }

    output
}
