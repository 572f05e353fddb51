#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for extracting market expectations from Focus report PDFs into
//! the JSON snapshot the dashboard falls back to.
//!
//! [`run`] is the whole pipeline: list the most recent `R<YYYYMMDD>.pdf`
//! files, extract each one, build per-variable evolution, and write the
//! snapshot. Per-file failures never abort a run; only configuration and
//! snapshot-writing errors are returned.

pub mod collect;
pub mod config;
pub mod snapshot;

use chrono::NaiveDateTime;
use focus_report_ingest_models::Snapshot;
use focus_report_pdf::{DocumentDecoder, PdfDecoder, PdfError, ReportExtractor};
use thiserror::Error;

pub use config::{ConfigLayer, FocusConfig};

/// Errors that can abort an extraction run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization or parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration is missing or malformed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// The extractor could not be built.
    #[error(transparent)]
    Pdf(#[from] PdfError),
}

/// Runs the pipeline with the PDF decoder, stamping the snapshot with the
/// current local time.
///
/// # Errors
///
/// Returns [`IngestError`] if the extractor cannot be built or the snapshot
/// cannot be written.
pub fn run(config: &FocusConfig) -> Result<Snapshot, IngestError> {
    run_with(config, &PdfDecoder, chrono::Local::now().naive_local())
}

/// Runs the pipeline with an explicit decoder and timestamp.
///
/// # Errors
///
/// Returns [`IngestError`] if the extractor cannot be built or the snapshot
/// cannot be written.
pub fn run_with<D: DocumentDecoder + ?Sized>(
    config: &FocusConfig,
    decoder: &D,
    generated_at: NaiveDateTime,
) -> Result<Snapshot, IngestError> {
    let extractor = ReportExtractor::new(config.variables.as_slice())?;

    let reports = collect::collect_reports(
        &config.reports_dir,
        config.max_reports,
        decoder,
        &extractor,
    );
    log::info!("Processed {} report(s)", reports.len());

    let evolution =
        focus_report_analytics::analyze_evolution(&reports, config.variables.as_slice());
    log::info!("Evolution analysis complete");

    let snapshot = snapshot::build_snapshot(generated_at, reports, evolution);
    snapshot::write_snapshot(&snapshot, &config.output_file)?;
    log::info!("Snapshot saved to {}", config.output_file.display());

    Ok(snapshot)
}
