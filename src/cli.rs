//! Command-line interface for the fund analyzer.

use navscope::analysis::{AnalysisReport, FundAnalysis};
use navscope::analytics::ResultFormatter;
use navscope::config::AnalyzerFileConfig;
use navscope::error::{AnalyticsError, Result};
use navscope::export::{export_report_json, SeriesExporter};
use navscope::payload::{load_benchmark, load_catalog, load_fund_detail, search_catalog, FundDetail};
use navscope::period::TimePeriod;
use navscope::report::{render_report, CsvHandoff, ReturnScale};
use navscope::types::TimeSeries;

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// navscope - Compare mutual fund NAV history against a benchmark index.
#[derive(Parser)]
#[command(name = "navscope")]
#[command(version)]
#[command(about = "Compare mutual fund NAV history against a benchmark index")]
#[command(long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Path to TOML configuration file
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the fund catalog by scheme name
    Search {
        /// Path to the catalog JSON file
        #[arg(short, long)]
        catalog: PathBuf,

        /// Case-insensitive search term
        term: String,
    },

    /// Analyze a fund against the benchmark
    Analyze {
        /// Path to the fund detail JSON file
        #[arg(short, long)]
        fund: PathBuf,

        /// Path to the benchmark CSV or JSON file (defaults to the config)
        #[arg(short, long)]
        benchmark: Option<PathBuf>,

        /// Lookback period (defaults to the config)
        #[arg(short, long, value_enum)]
        period: Option<PeriodArg>,

        /// Also print scheme metadata
        #[arg(long)]
        details: bool,
    },

    /// Write aligned daily returns for an external tear-sheet generator
    Report {
        /// Path to the fund detail JSON file
        #[arg(short, long)]
        fund: PathBuf,

        /// Path to the benchmark CSV or JSON file (defaults to the config)
        #[arg(short, long)]
        benchmark: Option<PathBuf>,

        /// Output file for the returns CSV
        #[arg(long, default_value = "report_returns.csv")]
        out: PathBuf,

        /// Write percent values instead of decimal fractions
        #[arg(long)]
        percent: bool,
    },

    /// Export series and analysis results to files
    Export {
        /// Path to the fund detail JSON file
        #[arg(short, long)]
        fund: PathBuf,

        /// Path to the benchmark CSV or JSON file (defaults to the config)
        #[arg(short, long)]
        benchmark: Option<PathBuf>,

        /// Lookback period (defaults to the config)
        #[arg(short, long, value_enum)]
        period: Option<PeriodArg>,

        /// Output directory
        #[arg(short, long, default_value = "navscope_export")]
        dir: PathBuf,
    },

    /// Generate an example configuration file
    Init {
        /// Output path for config file
        #[arg(long, default_value = "navscope.toml")]
        path: PathBuf,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PeriodArg {
    #[value(name = "1m")]
    OneMonth,
    #[value(name = "3m")]
    ThreeMonths,
    #[value(name = "6m")]
    SixMonths,
    #[value(name = "1y")]
    OneYear,
    #[value(name = "3y")]
    ThreeYears,
    #[value(name = "5y")]
    FiveYears,
    #[value(name = "all")]
    All,
}

impl From<PeriodArg> for TimePeriod {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::OneMonth => TimePeriod::OneMonth,
            PeriodArg::ThreeMonths => TimePeriod::ThreeMonths,
            PeriodArg::SixMonths => TimePeriod::SixMonths,
            PeriodArg::OneYear => TimePeriod::OneYear,
            PeriodArg::ThreeYears => TimePeriod::ThreeYears,
            PeriodArg::FiveYears => TimePeriod::FiveYears,
            PeriodArg::All => TimePeriod::AllTime,
        }
    }
}

impl Cli {
    /// Initialize logging based on verbosity level.
    pub fn init_logging(&self) -> Result<()> {
        let level = match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber).map_err(|e| {
            AnalyticsError::ConfigError(format!("failed to set tracing subscriber: {}", e))
        })
    }

    /// Configuration from `--config`, or the defaults.
    fn file_config(&self) -> Result<AnalyzerFileConfig> {
        match &self.config {
            Some(path) => AnalyzerFileConfig::load(path),
            None => Ok(AnalyzerFileConfig::default()),
        }
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging()?;

    match &cli.command {
        Commands::Search { catalog, term } => search_funds(catalog, term, cli.output),

        Commands::Analyze {
            fund,
            benchmark,
            period,
            details,
        } => {
            let config = cli.file_config()?;
            analyze_fund(&config, fund, benchmark.as_deref(), *period, *details, cli.output)
        }

        Commands::Report {
            fund,
            benchmark,
            out,
            percent,
        } => {
            let config = cli.file_config()?;
            write_report(&config, fund, benchmark.as_deref(), out, *percent)
        }

        Commands::Export {
            fund,
            benchmark,
            period,
            dir,
        } => {
            let config = cli.file_config()?;
            export_all(&config, fund, benchmark.as_deref(), *period, dir)
        }

        Commands::Init { path } => init_config(path),
    }
}

fn search_funds(catalog_path: &Path, term: &str, output: OutputFormat) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let hits = search_catalog(&catalog, term);
    info!("{} of {} funds match '{}'", hits.len(), catalog.len(), term);

    match output {
        OutputFormat::Text => ResultFormatter::print_search_results(term, &hits),
        OutputFormat::Json => println!("{}", ResultFormatter::to_json(&hits)),
        OutputFormat::Csv => {
            println!("scheme_code,scheme_name");
            for entry in &hits {
                println!(
                    "{},\"{}\"",
                    entry.scheme_code,
                    entry.scheme_name.replace('"', "\"\"")
                );
            }
        }
    }

    Ok(())
}

/// Load the fund and benchmark series named on the command line or in the config.
fn load_inputs(
    config: &AnalyzerFileConfig,
    fund_path: &Path,
    benchmark_path: Option<&Path>,
) -> Result<(FundDetail, TimeSeries, TimeSeries)> {
    let options = config.load_options();

    let detail = load_fund_detail(fund_path)?;
    let fund = detail.to_series(&options)?;

    let benchmark_path = match benchmark_path {
        Some(path) => path.to_path_buf(),
        None => config.benchmark.path.as_ref().map(PathBuf::from).ok_or_else(|| {
            AnalyticsError::ConfigError(
                "No benchmark file given; pass --benchmark or set [benchmark].path".to_string(),
            )
        })?,
    };
    let benchmark = load_benchmark(&config.benchmark.name, &benchmark_path, &options)?;

    Ok((detail, fund, benchmark))
}

fn run_analysis(
    config: &AnalyzerFileConfig,
    fund: &TimeSeries,
    benchmark: &TimeSeries,
    period: Option<PeriodArg>,
) -> Result<AnalysisReport> {
    let mut request = config.to_request()?;
    if let Some(period) = period {
        request = request.with_period(period.into());
    }
    FundAnalysis::run(fund, benchmark, &request)
}

fn analyze_fund(
    config: &AnalyzerFileConfig,
    fund_path: &Path,
    benchmark_path: Option<&Path>,
    period: Option<PeriodArg>,
    details: bool,
    output: OutputFormat,
) -> Result<()> {
    let (detail, fund, benchmark) = load_inputs(config, fund_path, benchmark_path)?;
    let report = run_analysis(config, &fund, &benchmark, period)?;

    match output {
        OutputFormat::Text => {
            if details {
                ResultFormatter::print_fund_details(&detail.meta);
            }
            ResultFormatter::print_report(&report);
        }
        OutputFormat::Json => println!("{}", ResultFormatter::to_json(&report)),
        OutputFormat::Csv => {
            println!("{}", ResultFormatter::csv_header());
            println!("{}", ResultFormatter::to_csv_line(&report));
        }
    }

    Ok(())
}

fn write_report(
    config: &AnalyzerFileConfig,
    fund_path: &Path,
    benchmark_path: Option<&Path>,
    out: &Path,
    percent: bool,
) -> Result<()> {
    let (_, fund, benchmark) = load_inputs(config, fund_path, benchmark_path)?;

    let scale = if percent {
        ReturnScale::Percent
    } else {
        ReturnScale::Fraction
    };
    let bytes = render_report(&CsvHandoff::new(scale), &fund, &benchmark)?;
    fs::write(out, &bytes)?;

    println!("Wrote tear-sheet input to {}", out.display());
    Ok(())
}

fn export_all(
    config: &AnalyzerFileConfig,
    fund_path: &Path,
    benchmark_path: Option<&Path>,
    period: Option<PeriodArg>,
    dir: &Path,
) -> Result<()> {
    let (_, fund, benchmark) = load_inputs(config, fund_path, benchmark_path)?;
    let report = run_analysis(config, &fund, &benchmark, period)?;

    fs::create_dir_all(dir)?;
    let exporter = SeriesExporter::new(config.export_config()?);

    exporter.export_series(&fund, dir.join("fund_nav.csv"))?;
    exporter.export_series(&benchmark, dir.join("benchmark.csv"))?;
    if let Some(comparison) = &report.comparison {
        exporter.export_aligned(&comparison.normalized, dir.join("normalized.csv"))?;
        exporter.export_comparison(comparison, dir.join("comparison.csv"))?;
    }
    export_report_json(&report, dir.join("report.json"))?;

    println!("Exported analysis of {} to {}", report.fund_name, dir.display());
    Ok(())
}

fn init_config(path: &Path) -> Result<()> {
    fs::write(path, AnalyzerFileConfig::example())?;
    println!("Created example configuration file: {}", path.display());
    println!("\nEdit this file to customize the analysis, then run:");
    println!("  navscope -C {} analyze -f fund.json", path.display());
    Ok(())
}
