//! Integration tests for the fund analytics pipeline.

use chrono::{Duration, NaiveDate};
use navscope::align::align;
use navscope::analysis::{AnalysisRequest, FundAnalysis};
use navscope::cache::{Endpoint, TtlCache};
use navscope::config::AnalyzerFileConfig;
use navscope::error::AnalyticsError;
use navscope::export::series_to_csv;
use navscope::normalize::normalize_pair;
use navscope::outperformance::outperformance;
use navscope::payload::{parse_benchmark_csv, parse_fund_detail, LoadOptions};
use navscope::period::TimePeriod;
use navscope::report::{prepare_report_input, render_report, CsvHandoff};
use navscope::returns::{horizon_return, total_return, Horizon, ReturnsSummary};
use navscope::risk::{
    daily_returns, drawdown, max_drawdown, rolling_volatility, running_max,
    DEFAULT_VOLATILITY_WINDOW, TRADING_DAYS_PER_YEAR,
};
use navscope::types::{PricePoint, ReturnPoint, ReturnSeries, TimeSeries};

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n - 1)
}

fn points(values: &[f64]) -> Vec<PricePoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| PricePoint::new(day(i as i64 + 1), *v))
        .collect()
}

/// Synthetic NAV with a trend and a deterministic wobble.
fn create_synthetic_nav(days: usize, initial: f64, daily_return: f64) -> Vec<PricePoint> {
    let mut nav = initial;
    (0..days)
        .map(|i| {
            let noise = ((i as f64 * 0.7).sin() * 2.0 + (i as f64 * 1.3).cos()) * 0.002;
            nav *= 1.0 + daily_return + noise;
            PricePoint::new(day(i as i64 + 1), nav)
        })
        .collect()
}

/// Build a fund detail JSON payload, newest record first.
fn fund_detail_json(name: &str, nav: &[PricePoint]) -> String {
    let data: Vec<String> = nav
        .iter()
        .rev()
        .map(|p| {
            format!(
                r#"{{"date": "{}", "nav": "{:.5}"}}"#,
                p.date().format("%d-%m-%Y"),
                p.value()
            )
        })
        .collect();
    format!(
        r#"{{"meta": {{"fund_house": "Example AMC", "scheme_name": "{}", "scheme_code": 100001}}, "data": [{}]}}"#,
        name,
        data.join(",")
    )
}

#[test]
fn test_four_day_scenario() {
    let pair = align(
        &points(&[10.0, 11.0, 9.0, 12.0]),
        &points(&[100.0, 105.0, 95.0, 110.0]),
    );
    assert_eq!(pair.len(), 4);

    let normalized = normalize_pair(&pair).unwrap();
    let fund = normalized.fund().values();
    let bench = normalized.benchmark().values();
    for (got, want) in fund.iter().zip([100.0, 110.0, 90.0, 120.0]) {
        assert!((got - want).abs() < 1e-9);
    }
    for (got, want) in bench.iter().zip([100.0, 105.0, 95.0, 110.0]) {
        assert!((got - want).abs() < 1e-9);
    }

    assert!((total_return(pair.fund()).unwrap() - 20.0).abs() < 1e-9);
    assert!((total_return(pair.benchmark()).unwrap() - 10.0).abs() < 1e-9);
}

#[test]
fn test_drawdown_scenario() {
    let series = TimeSeries::new("Fund", points(&[10.0, 12.0, 9.0, 11.0]));

    assert_eq!(running_max(&series), vec![10.0, 12.0, 12.0, 12.0]);

    let dd: Vec<f64> = drawdown(&series)
        .unwrap()
        .values()
        .into_iter()
        .map(|v| v.unwrap())
        .collect();
    let expected = [0.0, 0.0, -25.0, -8.33];
    for (got, want) in dd.iter().zip(expected) {
        assert!((got - want).abs() < 0.01, "{} vs {}", got, want);
    }
    assert!((max_drawdown(&series).unwrap() + 25.0).abs() < 1e-9);
}

#[test]
fn test_rolling_volatility_short_history_is_undefined() {
    let series = TimeSeries::new("Fund", create_synthetic_nav(20, 10.0, 0.001));
    let returns = daily_returns(&series).unwrap();
    let vol = rolling_volatility(&returns, DEFAULT_VOLATILITY_WINDOW, TRADING_DAYS_PER_YEAR)
        .unwrap();

    assert_eq!(vol.len(), 20);
    assert!(vol.values().iter().all(Option::is_none));
}

#[test]
fn test_outperformance_scenario() {
    let returns = |values: [f64; 3]| {
        ReturnSeries::new(
            "r",
            values
                .iter()
                .enumerate()
                .map(|(i, v)| ReturnPoint::defined(day(i as i64 + 1), *v))
                .collect(),
        )
    };

    let stats = outperformance(&returns([1.0, -1.0, 2.0]), &returns([0.0, 0.0, 1.0])).unwrap();
    assert!((stats.pct_periods_outperformed - 66.7).abs() < 0.05);
    assert!((stats.avg_excess - 0.33).abs() < 0.01);
}

#[test]
fn test_horizon_returns_are_not_available_for_short_history() {
    let series = TimeSeries::new("Fund", create_synthetic_nav(10, 10.0, 0.001));

    assert!(horizon_return(&series, Horizon::OneWeek).unwrap().is_some());
    assert_eq!(horizon_return(&series, Horizon::OneMonth).unwrap(), None);
    assert_eq!(horizon_return(&series, Horizon::OneYear).unwrap(), None);

    let single = TimeSeries::new("Fund", points(&[10.0]));
    let summary = ReturnsSummary::from_series(&single).unwrap();
    assert_eq!(summary.one_day, None);
    assert_eq!(summary.total, None);
}

#[test]
fn test_payload_to_analysis_pipeline() {
    let nav = create_synthetic_nav(400, 10.0, 0.0008);
    let detail = parse_fund_detail(&fund_detail_json("Example Flexi Cap Fund", &nav)).unwrap();
    let fund = detail.to_series(&LoadOptions::default()).unwrap();
    assert_eq!(fund.len(), 400);

    // Benchmark trades on fewer days and starts later.
    let mut csv = String::from("Date,Close\n");
    for p in create_synthetic_nav(420, 1000.0, 0.0005).iter().skip(50) {
        if p.date().format("%u").to_string() != "7" {
            csv.push_str(&format!("{},{:.2}\n", p.date(), p.value()));
        }
    }
    let benchmark =
        parse_benchmark_csv("BSE 500 Index", csv.as_bytes(), &LoadOptions::default()).unwrap();

    let request = AnalysisRequest::default().with_period(TimePeriod::AllTime);
    let report = FundAnalysis::run(&fund, &benchmark, &request).unwrap();
    let comparison = report.comparison.as_ref().unwrap();

    assert_eq!(report.fund_name, "Example Flexi Cap Fund");
    assert_eq!(comparison.benchmark_name, "BSE 500 Index");
    assert!(comparison.normalized.len() < 350);
    assert_eq!(comparison.normalized.fund().values()[0], 100.0);
    assert_eq!(comparison.normalized.benchmark().values()[0], 100.0);
    assert!(comparison
        .fund_drawdown
        .values()
        .iter()
        .all(|v| v.unwrap() <= 0.0));
    assert!(comparison.rolling.iter().all(|r| r.outperformance.is_some()));

    let vol = comparison.stat("Average Volatility").unwrap();
    assert!(vol.fund_value.unwrap() > 0.0);
    assert_eq!(comparison.stats.len(), 4);

    // The report hand-off sees the same common dates, minus the first.
    let input = prepare_report_input(&fund, &benchmark).unwrap();
    assert_eq!(input.len(), comparison.normalized.len() - 1);
    let bytes = render_report(&CsvHandoff::default(), &fund, &benchmark).unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap().lines().count(),
        input.len() + 1
    );
}

#[test]
fn test_period_without_benchmark_overlap() {
    let fund = TimeSeries::new("Fund", create_synthetic_nav(100, 10.0, 0.001));
    let benchmark = TimeSeries::new("Index", points(&[100.0, 101.0, 102.0]));

    let request = AnalysisRequest::default().with_period(TimePeriod::OneMonth);
    let report = FundAnalysis::run(&fund, &benchmark, &request).unwrap();

    assert!(report.comparison.is_none());
    assert!(report.summary.one_month.is_some());
}

#[test]
fn test_report_requires_overlap() {
    let fund = TimeSeries::new("Fund", points(&[10.0, 11.0]));
    let benchmark = TimeSeries::new(
        "Index",
        vec![PricePoint::new(day(10), 100.0), PricePoint::new(day(11), 101.0)],
    );

    assert!(matches!(
        prepare_report_input(&fund, &benchmark),
        Err(AnalyticsError::AlignmentEmpty)
    ));
}

#[test]
fn test_config_drives_request_and_cache() {
    let config: AnalyzerFileConfig = toml::from_str(
        r#"
[analysis]
period = "6m"
rolling_windows = [30]

[cache]
detail_ttl_secs = 0
"#,
    )
    .unwrap();

    let request = config.to_request().unwrap();
    assert_eq!(request.period, TimePeriod::SixMonths);
    assert_eq!(request.rolling_windows.len(), 1);

    let mut cache = TtlCache::new(config.cache_ttl(Endpoint::FundDetail));
    let key = Endpoint::FundDetail.key().param("scheme_code", 100001);
    let mut fetches = 0;
    for _ in 0..2 {
        cache
            .get_or_try_insert_with::<AnalyticsError, _>(key.clone(), || {
                fetches += 1;
                Ok(TimeSeries::new("Fund", points(&[10.0, 11.0])))
            })
            .unwrap();
    }
    // A zero TTL never serves from cache.
    assert_eq!(fetches, 2);
}

#[test]
fn test_export_matches_input_order() {
    let series = TimeSeries::new("Fund", points(&[10.0, 10.25]));
    let csv = series_to_csv(&series).unwrap();
    assert_eq!(csv.lines().nth(1), Some("2024-01-01,10.0000"));
    assert_eq!(csv.lines().nth(2), Some("2024-01-02,10.2500"));
}
