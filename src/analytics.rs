//! Terminal, JSON and CSV reporting of analysis results.

use crate::analysis::{AnalysisReport, BenchmarkComparison};
use crate::payload::{FundCatalogEntry, FundMeta};
use crate::returns::{Horizon, ReturnsSummary};
use crate::types::ComparisonStat;
use crate::viz::{pair_sparklines, returns_histogram};
use colored::Colorize;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

/// Format results for terminal display.
pub struct ResultFormatter;

impl ResultFormatter {
    /// Print a full analysis report to stdout.
    pub fn print_report(report: &AnalysisReport) {
        println!();
        println!("{}", "═".repeat(60).blue());
        println!("{}", " FUND ANALYSIS ".bold().blue());
        println!("{}", "═".repeat(60).blue());
        println!();

        Self::print_summary(&report.summary);

        match &report.comparison {
            Some(comparison) => Self::print_comparison(comparison, report),
            None => println!(
                "{}",
                format!(
                    "No overlapping benchmark data for {} over {}.",
                    report.fund_name, report.period
                )
                .yellow()
            ),
        }

        println!("{}", "═".repeat(60).blue());
    }

    /// Print headline returns for one fund.
    pub fn print_summary(summary: &ReturnsSummary) {
        println!("{}", "Overview".bold().underline());
        println!("  Fund:            {}", summary.name);
        println!(
            "  History:         {} to {}",
            summary.first_date.format("%Y-%m-%d"),
            summary.latest_date.format("%Y-%m-%d")
        );
        println!("  Latest NAV:      {:>12.4}", summary.latest_value);
        println!();

        println!("{}", "Returns".bold().underline());
        for horizon in Horizon::ALL {
            println!(
                "  {:<17}{}",
                format!("{}:", horizon.label()),
                Self::format_optional_pct(summary.get(horizon))
            );
        }
        println!();
    }

    /// Print scheme metadata.
    pub fn print_fund_details(meta: &FundMeta) {
        let mut builder = Builder::new();
        builder.push_record(["Field", "Value"]);
        for (label, value) in meta.display_rows() {
            builder.push_record([label.to_string(), value]);
        }
        println!("{}", builder.build().with(Style::rounded()));
    }

    fn print_comparison(comparison: &BenchmarkComparison, report: &AnalysisReport) {
        println!(
            "{}",
            format!(
                "Benchmark Comparison ({}, {})",
                comparison.benchmark_name, report.period
            )
            .bold()
            .underline()
        );
        println!("  Common dates:    {:>12}", comparison.normalized.len());
        let (fund_line, benchmark_line) = pair_sparklines(&comparison.normalized, 40);
        println!("  Fund (=100):     {}", fund_line);
        println!("  Benchmark:       {}", benchmark_line);
        println!();

        Self::print_stats_table(&comparison.stats);
        println!();

        let mut builder = Builder::new();
        builder.push_record(["Window", "Periods", "Outperformed", "Avg Excess"]);
        for rolling in &comparison.rolling {
            match rolling.outperformance {
                Some(o) => builder.push_record([
                    rolling.window.label().to_string(),
                    o.periods.to_string(),
                    format!("{:.1}%", o.pct_periods_outperformed),
                    format!("{:+.2}", o.avg_excess),
                ]),
                None => builder.push_record([
                    rolling.window.label().to_string(),
                    "0".to_string(),
                    "N/A".to_string(),
                    "N/A".to_string(),
                ]),
            }
        }
        println!("{}", "Rolling Returns".bold().underline());
        println!("{}", builder.build().with(Style::rounded()));

        if let Some(rolling) = comparison
            .rolling
            .iter()
            .find(|r| r.outperformance.is_some())
        {
            println!();
            println!(
                "{}",
                format!("{} Return Distribution (Fund)", rolling.window)
                    .bold()
                    .underline()
            );
            print!("{}", returns_histogram(&rolling.fund, 30));
        }
    }

    /// Print fund vs benchmark statistics as a table.
    pub fn print_stats_table(stats: &[ComparisonStat]) {
        let mut builder = Builder::new();
        builder.push_record(["Metric", "Fund", "Benchmark", "Difference"]);
        for stat in stats {
            builder.push_record([
                stat.metric_name.clone(),
                Self::plain_pct(stat.fund_value),
                Self::plain_pct(stat.benchmark_value),
                Self::plain_pct(stat.difference),
            ]);
        }
        println!("{}", builder.build().with(Style::rounded()));
    }

    /// Print catalog search hits.
    pub fn print_search_results(term: &str, hits: &[&FundCatalogEntry]) {
        if hits.is_empty() {
            println!("No funds found matching '{}'.", term);
            return;
        }

        let mut builder = Builder::new();
        builder.push_record(["Scheme Code", "Scheme Name"]);
        for entry in hits {
            builder.push_record([entry.scheme_code.to_string(), entry.scheme_name.clone()]);
        }
        println!("{}", builder.build().with(Style::rounded()));
        println!("{} fund(s) found.", hits.len());
    }

    fn format_optional_pct(pct: Option<f64>) -> String {
        match pct {
            Some(v) if v >= 0.0 => format!("{:+.2}%", v).green().to_string(),
            Some(v) => format!("{:.2}%", v).red().to_string(),
            None => "N/A".dimmed().to_string(),
        }
    }

    fn plain_pct(pct: Option<f64>) -> String {
        pct.map(|v| format!("{:.2}%", v))
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Serialize any result type as pretty JSON.
    pub fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Summary and comparison statistics as one CSV line.
    pub fn to_csv_line(report: &AnalysisReport) -> String {
        let opt = |v: Option<f64>| v.map(|x| format!("{:.4}", x)).unwrap_or_default();
        let stat = |name: &str| {
            report
                .comparison
                .as_ref()
                .and_then(|c| c.stat(name))
                .cloned()
                .unwrap_or_else(|| ComparisonStat::new(name, None, None))
        };
        let total = stat("Total Return");
        let vol = stat("Average Volatility");
        let max_dd = stat("Max Drawdown");

        format!(
            "\"{}\",{},{},{},{},{},{},{},{},{},{},{},{}",
            report.fund_name.replace('"', "\"\""),
            report.period.code(),
            report.summary.latest_date.format("%Y-%m-%d"),
            report.summary.latest_value,
            opt(report.summary.one_day),
            opt(report.summary.one_week),
            opt(report.summary.one_month),
            opt(report.summary.one_year),
            opt(report.summary.total),
            opt(total.fund_value),
            opt(total.benchmark_value),
            opt(vol.fund_value),
            opt(max_dd.fund_value)
        )
    }

    /// Get CSV header.
    pub fn csv_header() -> &'static str {
        "fund,period,latest_date,latest_nav,return_1d,return_1w,return_1m,return_1y,return_total,period_return_fund,period_return_benchmark,avg_volatility_fund,max_drawdown_fund"
    }
}
