//! Command-line interface components.

use crate::analysis::{Analysis, win_ratio_frame};
use crate::config::{HeaderCheck, Locale, PipelineConfig, StatusLabels};
use crate::constants::{DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_DIR};
use crate::pipeline::{Pipeline, PipelineOutput};
use crate::report::{ReportStats, ReportWriter};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "auction-reshaper")]
#[command(about = "Reshape wide auction-bid CSV exports into long form and export trend tables")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Path to the auction CSV export
    #[arg(value_name = "INPUT", default_value = DEFAULT_INPUT_PATH)]
    pub input_path: PathBuf,

    /// Directory for the exported aggregation tables
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Language of the export's header and status labels (detected from the header if omitted)
    #[arg(long, value_enum)]
    pub locale: Option<Locale>,

    /// How to treat a declared header that disagrees with the fixed column order
    #[arg(long, value_enum, default_value_t = HeaderCheck::Warn)]
    pub header_check: HeaderCheck,

    /// Status label counted as a win (defaults to the locale's label)
    #[arg(long)]
    pub won_label: Option<String>,

    /// Status label counted as a loss (defaults to the locale's label)
    #[arg(long)]
    pub lost_label: Option<String>,

    /// Status label counted as a first-stage rejection (defaults to the locale's label)
    #[arg(long)]
    pub rejected_label: Option<String>,

    /// Print the wide table, long table and aggregations
    #[arg(long)]
    pub show: bool,

    /// Reshape only; do not write aggregation tables
    #[arg(long)]
    pub no_report: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Build the pipeline configuration from defaults plus CLI overrides
    pub fn to_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default()
            .with_header_check(self.header_check)
            .with_output_dir(self.output_dir.clone());
        if let Some(locale) = self.locale {
            config = config.with_locale(locale);
        }

        if self.won_label.is_some() || self.lost_label.is_some() || self.rejected_label.is_some() {
            let defaults = config.locale.default_status_labels();
            config = config.with_status_labels(StatusLabels::new(
                self.won_label.clone().unwrap_or(defaults.won),
                self.lost_label.clone().unwrap_or(defaults.lost),
                self.rejected_label.clone().unwrap_or(defaults.rejected),
            ));
        }

        if self.no_report {
            config.without_report()
        } else {
            config
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("auction_reshaper={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Outcome of a CLI run
#[derive(Debug)]
pub struct RunSummary {
    pub output: PipelineOutput,
    pub report: Option<ReportStats>,
}

/// Execute the reshape and, unless disabled, the report export
pub fn run(args: &Args) -> Result<RunSummary> {
    let config = args.to_config();
    let pipeline = Pipeline::new(config).context("Invalid configuration")?;

    println!("{}", "Reshaping auction export".bright_green().bold());
    println!(
        "  {} {}",
        "Input:".bright_cyan(),
        args.input_path.display()
    );

    let output = pipeline
        .run(&args.input_path)
        .with_context(|| format!("Failed to reshape {}", args.input_path.display()))?;

    let config = pipeline.config();
    let analysis = Analysis::new(&output.long, output.status_labels.clone())
        .context("Failed to build analysis frame")?;

    if args.show {
        print_tables(&output, &analysis)?;
    }

    let report = if config.write_report {
        let stats = ReportWriter::new(config.output_dir.clone())
            .write(&analysis)
            .with_context(|| {
                format!("Failed to write report to {}", config.output_dir.display())
            })?;
        Some(stats)
    } else {
        None
    };

    print_summary(&output, report.as_ref());
    Ok(RunSummary { output, report })
}

fn print_tables(output: &PipelineOutput, analysis: &Analysis) -> Result<()> {
    println!("\n{}", "Wide table".bright_yellow());
    println!("{}", output.wide.to_dataframe()?);

    println!("\n{}", "Long table".bright_yellow());
    println!("{}", output.long.to_dataframe()?);

    println!("\n{}", "Totals by year and status".bright_yellow());
    println!("{}", analysis.yearly_totals()?);

    println!("\n{}", "Totals by month and status".bright_yellow());
    println!("{}", analysis.monthly_totals()?);

    println!("\n{}", "Win ratio by year".bright_yellow());
    println!("{}", win_ratio_frame(&analysis.win_ratio_by_year()?)?);

    println!("\n{}", "Rejected by year".bright_yellow());
    println!("{}", analysis.rejected_by_year()?);

    let totals = analysis.win_loss_totals()?;
    println!("\n{}", "Won vs lost".bright_yellow());
    println!("{}", totals.to_dataframe(analysis.labels())?);
    Ok(())
}

fn print_summary(output: &PipelineOutput, report: Option<&ReportStats>) {
    let load = &output.wide.stats;
    let reshape = &output.long.stats;

    println!("\n{}", "Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        output.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {} ({:?} column mapping, {:?} labels)",
        "Wide rows:".bright_cyan(),
        output.wide.len().to_string().bright_white().bold(),
        load.mapping,
        output.wide.locale
    );
    if load.blank_rows_dropped > 0 || load.duplicate_headers_dropped > 0 {
        println!(
            "  {} {} blank, {} duplicate header",
            "Rows dropped:".bright_cyan(),
            load.blank_rows_dropped,
            load.duplicate_headers_dropped
        );
    }
    println!(
        "  {} {}",
        "Long records:".bright_cyan(),
        reshape.records_emitted.to_string().bright_white().bold()
    );
    if reshape.cells_not_applicable > 0 {
        println!(
            "  {} {}",
            "Non-count cells skipped:".bright_red(),
            reshape.cells_not_applicable.to_string().bright_red().bold()
        );
    }
    if let Some(report) = report {
        println!(
            "  {} {} files in {}",
            "Report:".bright_cyan(),
            report.files_written.len().to_string().bright_white(),
            report.output_dir.display()
        );
    }
}
