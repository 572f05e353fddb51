#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! PDF text decoding and labeled-row extraction for Focus reports.
//!
//! A report is decoded to per-page text ([`DocumentDecoder`], backed by
//! [`pdf_extract`] in production), the pages are concatenated, and a
//! [`ReportExtractor`] pulls the projections for each tracked variable out
//! of the text. [`extract_document`] ties the two together for a single
//! file and never fails: decode errors are logged and turned into a record
//! with no readings.

pub mod regex_rows;
pub mod report_date;

use std::path::Path;

use focus_report_ingest_models::ReportRecord;

pub use regex_rows::{LabelPattern, ReportExtractor};

/// Errors specific to PDF decoding and extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// A label pattern failed to compile.
    #[error("Invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns a document on disk into one text blob per page.
pub trait DocumentDecoder {
    /// Decodes the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the file cannot be read or decoded.
    fn decode_pages(&self, path: &Path) -> Result<Vec<String>, PdfError>;
}

/// [`DocumentDecoder`] backed by [`pdf_extract`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfDecoder;

impl DocumentDecoder for PdfDecoder {
    fn decode_pages(&self, path: &Path) -> Result<Vec<String>, PdfError> {
        let bytes = std::fs::read(path)?;

        log::debug!("Read {} bytes from {}", bytes.len(), path.display());

        // pdf_extract panics on some malformed documents.
        let pages = std::panic::catch_unwind(|| {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })
        .map_err(|_| PdfError::Extraction("PDF decoder panicked".to_owned()))?
        .map_err(|e| PdfError::Extraction(format!("failed to extract text from PDF: {e}")))?;

        log::debug!("Decoded {} page(s) from {}", pages.len(), path.display());

        Ok(pages)
    }
}

/// Result of processing one report file.
///
/// Both variants carry a record, so callers can collect records without
/// special-casing failures.
#[derive(Debug)]
pub enum DocumentOutcome {
    /// The document was decoded and scanned.
    Extracted(ReportRecord),
    /// Decoding failed; the record has no readings.
    Failed {
        /// Record with the file-name date and no readings.
        record: ReportRecord,
        /// Why decoding failed.
        cause: PdfError,
    },
}

impl DocumentOutcome {
    /// The record produced for the document.
    #[must_use]
    pub const fn record(&self) -> &ReportRecord {
        match self {
            Self::Extracted(record) | Self::Failed { record, .. } => record,
        }
    }

    /// Consumes the outcome, returning its record.
    #[must_use]
    pub fn into_record(self) -> ReportRecord {
        match self {
            Self::Extracted(record) | Self::Failed { record, .. } => record,
        }
    }

    /// Returns `true` if decoding failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Decodes and scans a single report file.
///
/// The report date comes from the file name (see
/// [`report_date::parse_report_date`]); a decode failure is logged and
/// yields an empty record that still carries that date.
pub fn extract_document<D: DocumentDecoder + ?Sized>(
    decoder: &D,
    extractor: &ReportExtractor,
    path: &Path,
) -> DocumentOutcome {
    let report_date = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(report_date::parse_report_date);

    match decoder.decode_pages(path) {
        Ok(pages) => {
            let text = pages.concat();
            log::debug!(
                "Extracted {} characters of text from {}",
                text.len(),
                path.display()
            );
            DocumentOutcome::Extracted(ReportRecord {
                report_date,
                variables: extractor.extract(&text),
            })
        }
        Err(cause) => {
            log::error!("Failed to process {}: {cause}", path.display());
            DocumentOutcome::Failed {
                record: ReportRecord::empty(report_date),
                cause,
            }
        }
    }
}
