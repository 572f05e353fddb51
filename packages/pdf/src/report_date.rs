//! Report dates from file names.
//!
//! Focus reports are published as `R<YYYYMMDD>.pdf`. The date embedded in
//! the name is the only reliable report date, so a file whose name does not
//! follow the convention cannot be placed in the series.

use std::sync::LazyLock;

use chrono::NaiveDate;
use focus_report_ingest_models::format::format_date;
use regex::Regex;

static REPORT_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^R(\d{8})\.pdf$").expect("valid regex"));

/// Parses the report date from a file name such as `R20250103.pdf`.
///
/// Returns `None` if the name does not follow the convention or the digits
/// are not a valid calendar date (e.g. `R20251301.pdf`).
#[must_use]
pub fn parse_report_date(file_name: &str) -> Option<NaiveDate> {
    let caps = REPORT_FILE_RE.captures(file_name)?;
    let digits = caps.get(1)?.as_str();
    match NaiveDate::parse_from_str(digits, "%Y%m%d") {
        Ok(date) => Some(date),
        Err(e) => {
            log::debug!("Ignoring {file_name}: invalid date digits '{digits}': {e}");
            None
        }
    }
}

/// Parses the report date from a file name and renders it as `DD/MM/YYYY`.
#[must_use]
pub fn report_date_label(file_name: &str) -> Option<String> {
    parse_report_date(file_name).map(format_date)
}
