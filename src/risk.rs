//! Risk metrics: daily returns, rolling volatility and drawdown.
//!
//! Each function allocates a new series and leaves its input untouched.
//! Derived values are in percent.

use crate::error::{AnalyticsError, Result};
use crate::returns::{check_reference, empty_series, pct_change};
use crate::types::{ReturnPoint, ReturnSeries, TimeSeries};

/// Trading days used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Trailing window for rolling volatility, in daily returns.
pub const DEFAULT_VOLATILITY_WINDOW: usize = 30;

/// Simple percentage change between consecutive observations.
///
/// The first point has no predecessor and is undefined.
pub fn daily_returns(series: &TimeSeries) -> Result<ReturnSeries> {
    let points = series.points();
    let mut out = Vec::with_capacity(points.len());

    if let Some(first) = points.first() {
        out.push(ReturnPoint::undefined(first.date()));
    }
    for w in points.windows(2) {
        let prev = check_reference(series.name(), w[0].date(), w[0].value())?;
        out.push(ReturnPoint::defined(w[1].date(), pct_change(prev, w[1].value())));
    }

    Ok(ReturnSeries::new(series.name(), out))
}

/// Sample standard deviation (n - 1 denominator).
fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Annualized rolling volatility of a daily-return series.
///
/// The value at `i` is the sample standard deviation of returns
/// `i + 1 - window ..= i`, scaled by `sqrt(periods_per_year)`. It is
/// undefined while the trailing window holds fewer than `window` defined
/// returns.
pub fn rolling_volatility(
    returns: &ReturnSeries,
    window: usize,
    periods_per_year: f64,
) -> Result<ReturnSeries> {
    if window < 2 {
        return Err(AnalyticsError::InvalidInput(format!(
            "volatility window must be at least 2 returns, got {}",
            window
        )));
    }
    if periods_per_year <= 0.0 || !periods_per_year.is_finite() {
        return Err(AnalyticsError::InvalidInput(format!(
            "periods per year must be positive, got {}",
            periods_per_year
        )));
    }

    let annualization = periods_per_year.sqrt();
    let points = returns.points();
    let mut buf = Vec::with_capacity(window);

    let out = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            if i + 1 < window {
                return ReturnPoint::undefined(point.date);
            }
            buf.clear();
            buf.extend(points[i + 1 - window..=i].iter().filter_map(|p| p.value));
            if buf.len() < window {
                ReturnPoint::undefined(point.date)
            } else {
                ReturnPoint::defined(point.date, sample_std(&buf) * annualization)
            }
        })
        .collect();

    Ok(ReturnSeries::new(returns.name(), out))
}

/// Running maximum of the series, inclusive of the current point.
pub fn running_max(series: &TimeSeries) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    series
        .points()
        .iter()
        .map(|p| {
            if p.value() > peak {
                peak = p.value();
            }
            peak
        })
        .collect()
}

/// Percentage decline from the running maximum at each point.
///
/// Always `<= 0`; the first point is exactly 0.
pub fn drawdown(series: &TimeSeries) -> Result<ReturnSeries> {
    if series.is_empty() {
        return Err(empty_series(series));
    }

    let peaks = running_max(series);
    let mut out = Vec::with_capacity(series.len());
    for (point, peak) in series.points().iter().zip(peaks) {
        let peak = check_reference(series.name(), point.date(), peak)?;
        // Guard against -0.0 and rounding above zero at new highs.
        let dd = if point.value() >= peak {
            0.0
        } else {
            pct_change(peak, point.value())
        };
        out.push(ReturnPoint::defined(point.date(), dd));
    }

    Ok(ReturnSeries::new(series.name(), out))
}

/// Deepest drawdown (most negative value).
pub fn max_drawdown(series: &TimeSeries) -> Result<f64> {
    drawdown(series)?
        .min_defined()
        .ok_or_else(|| empty_series(series))
}

/// Drawdown at the latest observation.
pub fn current_drawdown(series: &TimeSeries) -> Result<f64> {
    drawdown(series)?
        .last_value()
        .ok_or_else(|| empty_series(series))
}

/// Mean of the defined values, `None` if there are none.
pub fn mean_defined(series: &ReturnSeries) -> Option<f64> {
    let (sum, count) = series
        .defined()
        .fold((0.0, 0usize), |(s, c), (_, v)| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;
    use chrono::{Duration, NaiveDate};

    fn series(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        TimeSeries::new(
            "Fund",
            values
                .iter()
                .enumerate()
                .map(|(i, v)| PricePoint::new(start + Duration::days(i as i64), *v))
                .collect(),
        )
    }

    #[test]
    fn test_daily_returns() {
        let returns = daily_returns(&series(&[100.0, 101.0, 99.99])).unwrap();
        let values = returns.values();

        assert_eq!(values[0], None);
        assert!((values[1].unwrap() - 1.0).abs() < 1e-10);
        assert!((values[2].unwrap() - (-1.0)).abs() < 1e-10);
    }

    #[test]
    fn test_daily_returns_empty() {
        let returns = daily_returns(&TimeSeries::new("Empty", vec![])).unwrap();
        assert!(returns.is_empty());
    }

    #[test]
    fn test_running_max() {
        assert_eq!(
            running_max(&series(&[10.0, 12.0, 9.0, 11.0])),
            vec![10.0, 12.0, 12.0, 12.0]
        );
    }

    #[test]
    fn test_drawdown() {
        let dd = drawdown(&series(&[10.0, 12.0, 9.0, 11.0])).unwrap();
        let values: Vec<f64> = dd.values().into_iter().map(|v| v.unwrap()).collect();

        assert_eq!(values[0], 0.0);
        assert_eq!(values[1], 0.0);
        assert!((values[2] - (-25.0)).abs() < 1e-10);
        assert!((values[3] - (-8.333333333)).abs() < 1e-6);
    }

    #[test]
    fn test_max_and_current_drawdown() {
        let s = series(&[10.0, 12.0, 9.0, 11.0]);
        assert!((max_drawdown(&s).unwrap() - (-25.0)).abs() < 1e-10);
        assert!((current_drawdown(&s).unwrap() - (-8.333333333)).abs() < 1e-6);
    }

    #[test]
    fn test_drawdown_empty_fails() {
        let empty = TimeSeries::new("Empty", vec![]);
        assert!(matches!(
            drawdown(&empty),
            Err(AnalyticsError::DegenerateSeries(_))
        ));
        assert!(max_drawdown(&empty).is_err());
        assert!(current_drawdown(&empty).is_err());
    }

    #[test]
    fn test_rolling_volatility_undefined_until_window_filled() {
        let returns = daily_returns(&series(&[100.0, 101.0, 102.0, 101.0, 103.0])).unwrap();
        // Returns: [None, r1, r2, r3, r4]; a window of 3 needs three defined values.
        let vol = rolling_volatility(&returns, 3, TRADING_DAYS_PER_YEAR).unwrap();
        let values = vol.values();

        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        assert_eq!(values[2], None);
        assert!(values[3].is_some());
        assert!(values[4].is_some());
    }

    #[test]
    fn test_rolling_volatility_value() {
        let returns = ReturnSeries::new(
            "r",
            (0..4)
                .map(|i| {
                    let date = NaiveDate::from_ymd_opt(2024, 1, 1 + i).unwrap();
                    ReturnPoint::defined(date, [1.0, -1.0, 1.0, -1.0][i as usize])
                })
                .collect(),
        );

        let vol = rolling_volatility(&returns, 4, 252.0).unwrap();
        // Sample std of [1, -1, 1, -1] is sqrt(4/3).
        let expected = (4.0_f64 / 3.0).sqrt() * 252.0_f64.sqrt();
        assert!((vol.last_value().unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn test_rolling_volatility_short_series_all_undefined() {
        let returns = daily_returns(&series(&[100.0, 101.0, 102.0])).unwrap();
        let vol = rolling_volatility(&returns, DEFAULT_VOLATILITY_WINDOW, TRADING_DAYS_PER_YEAR)
            .unwrap();

        assert_eq!(vol.len(), 3);
        assert_eq!(vol.defined_count(), 0);
    }

    #[test]
    fn test_rolling_volatility_rejects_bad_params() {
        let returns = daily_returns(&series(&[100.0, 101.0])).unwrap();
        assert!(rolling_volatility(&returns, 1, 252.0).is_err());
        assert!(rolling_volatility(&returns, 5, 0.0).is_err());
    }

    #[test]
    fn test_mean_defined() {
        let returns = daily_returns(&series(&[100.0, 110.0, 99.0])).unwrap();
        let mean = mean_defined(&returns).unwrap();
        assert!((mean - 0.0).abs() < 1e-10);

        let empty = daily_returns(&series(&[100.0])).unwrap();
        assert_eq!(mean_defined(&empty), None);
    }
}
