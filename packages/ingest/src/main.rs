#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the Focus report extraction tool.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use focus_report_ingest::snapshot::{read_snapshot, summarize};
use focus_report_ingest::{ConfigLayer, FocusConfig};
use focus_report_ingest_models::format::TIMESTAMP_FORMAT;

#[derive(Parser)]
#[command(name = "focus_report", about = "Focus report expectation extractor")]
struct Cli {
    /// TOML file with `reports_dir`, `output_file`, and `max_reports`
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory containing `R<YYYYMMDD>.pdf` reports (overrides `FOCUS_REPORTS_DIR`)
    #[arg(long, global = true)]
    reports_dir: Option<PathBuf>,
    /// Snapshot output path (overrides `FOCUS_OUTPUT_FILE`)
    #[arg(long, global = true)]
    output: Option<PathBuf>,
    /// Number of most recent reports to process (overrides `FOCUS_MAX_REPORTS`)
    #[arg(long, global = true)]
    max_reports: Option<usize>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the most recent reports and write the snapshot (default)
    Extract,
    /// Print the trend overview from the existing snapshot
    Summary,
}

fn init_logger() {
    let mut builder = pretty_env_logger::formatted_builder();
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let cli = Cli::parse();

    let config = FocusConfig::load(
        cli.config.as_deref(),
        ConfigLayer {
            reports_dir: cli.reports_dir,
            output_file: cli.output,
            max_reports: cli.max_reports,
        },
    )?;

    match cli.command.unwrap_or(Commands::Extract) {
        Commands::Extract => {
            println!("Processing Focus reports from {}", config.reports_dir.display());
            let start = Instant::now();

            let snapshot = focus_report_ingest::run(&config)?;

            println!(
                "Processed {} report(s) in {:.1}s",
                snapshot.reports.len(),
                start.elapsed().as_secs_f64()
            );
            println!("Snapshot saved to {}", config.output_file.display());
        }
        Commands::Summary => {
            let snapshot = read_snapshot(&config.output_file)?;
            println!(
                "Focus expectations as of {} ({} report(s))",
                snapshot.generated_at.format(TIMESTAMP_FORMAT),
                snapshot.reports.len()
            );
            println!(
                "{:<34} {:>10} {:>8} {:>9} {:>4}",
                "VARIABLE", "LATEST", "TREND", "CHANGE", "N"
            );
            println!("{}", "-".repeat(69));
            for row in summarize(&snapshot, config.variables.as_slice()) {
                println!("{row}");
            }
        }
    }

    Ok(())
}
