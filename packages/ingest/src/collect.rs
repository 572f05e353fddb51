//! Report discovery and batch extraction.

use std::path::{Path, PathBuf};

use focus_report_ingest_models::ReportRecord;
use focus_report_pdf::report_date::parse_report_date;
use focus_report_pdf::{DocumentDecoder, ReportExtractor, extract_document};

/// Returns `true` for names matching the `R*.pdf` glob.
fn is_report_candidate(file_name: &str) -> bool {
    file_name.starts_with('R') && file_name.ends_with(".pdf")
}

/// Lists the `limit` most recent report files in `dir`.
///
/// Candidates are files named `R*.pdf`, sorted by name descending; with the
/// fixed-width `R<YYYYMMDD>.pdf` convention that is newest first. A missing
/// or unreadable directory yields no files.
#[must_use]
pub fn list_report_files(dir: &Path, limit: usize) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read reports directory {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut files: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        // Follows symlinks; directories named like reports are not candidates.
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            is_report_candidate(&name).then(|| (name, entry.path()))
        })
        .collect();

    files.sort_by(|(a, _), (b, _)| b.cmp(a));
    files.truncate(limit);

    files.into_iter().map(|(_, path)| path).collect()
}

/// Extracts the `limit` most recent reports in `dir`, newest first.
///
/// Files whose name does not carry a valid date are dropped. Files that fail
/// to decode are kept with no readings. Never returns more than `limit`
/// records.
pub fn collect_reports<D: DocumentDecoder + ?Sized>(
    dir: &Path,
    limit: usize,
    decoder: &D,
    extractor: &ReportExtractor,
) -> Vec<ReportRecord> {
    let files = list_report_files(dir, limit);

    log::info!(
        "Found {} report file(s) to process in {}",
        files.len(),
        dir.display()
    );

    let mut records = Vec::with_capacity(files.len());
    let mut failed = 0_usize;

    for path in &files {
        let dated = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_report_date)
            .is_some();
        if !dated {
            log::warn!("Skipping {}: no report date in file name", path.display());
            continue;
        }

        log::info!("Extracting data from {}", path.display());

        let outcome = extract_document(decoder, extractor, path);
        if outcome.is_failed() {
            failed += 1;
        }
        records.push(outcome.into_record());
    }

    if failed > 0 {
        log::warn!("{failed} report(s) could not be decoded and have no readings");
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use focus_report_pdf::PdfError;

    /// Decoder that serves the file's own contents as a single page and
    /// fails on files containing `CORRUPT`.
    struct TextFileDecoder;

    impl DocumentDecoder for TextFileDecoder {
        fn decode_pages(&self, path: &Path) -> Result<Vec<String>, PdfError> {
            let text = std::fs::read_to_string(path)?;
            if text.contains("CORRUPT") {
                return Err(PdfError::Extraction("bad stream".to_owned()));
            }
            Ok(vec![text])
        }
    }

    fn touch(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn lists_candidates_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "R20250103.pdf", "");
        touch(dir.path(), "R20250117.pdf", "");
        touch(dir.path(), "R20241227.pdf", "");
        touch(dir.path(), "notes.pdf", "");
        touch(dir.path(), "R20250110.txt", "");
        std::fs::create_dir(dir.path().join("R20250124.pdf")).unwrap();

        let files = list_report_files(dir.path(), 10);

        assert_eq!(
            names(&files),
            vec!["R20250117.pdf", "R20250103.pdf", "R20241227.pdf"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinked_reports() {
        let dir = tempfile::tempdir().unwrap();
        let store = tempfile::tempdir().unwrap();
        touch(store.path(), "focus-2025-01-10.pdf", "");
        std::os::unix::fs::symlink(
            store.path().join("focus-2025-01-10.pdf"),
            dir.path().join("R20250110.pdf"),
        )
        .unwrap();
        touch(dir.path(), "R20250103.pdf", "");
        std::os::unix::fs::symlink(
            store.path().join("gone.pdf"),
            dir.path().join("R20250117.pdf"),
        )
        .unwrap();

        let files = list_report_files(dir.path(), 10);

        assert_eq!(names(&files), vec!["R20250110.pdf", "R20250103.pdf"]);
    }

    #[test]
    fn keeps_only_the_most_recent_ten() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=15 {
            touch(dir.path(), &format!("R202503{day:02}.pdf"), "");
        }

        let files = list_report_files(dir.path(), 10);

        assert_eq!(files.len(), 10);
        assert_eq!(names(&files)[0], "R20250315.pdf");
        assert_eq!(names(&files)[9], "R20250306.pdf");
    }

    #[test]
    fn missing_directory_yields_nothing() {
        assert!(list_report_files(Path::new("/nonexistent/focus"), 10).is_empty());
    }

    #[test]
    fn collects_dated_reports_and_drops_undated() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "R20250110.pdf", "IPCA (variação %)\n5.0 4.1 3.7\n");
        touch(dir.path(), "R20250103.pdf", "IPCA (variação %)\n4.9 4.0 3.6\n");
        touch(dir.path(), "R20251399.pdf", "IPCA (variação %)\n9 9 9\n");
        touch(dir.path(), "Rascunho.pdf", "IPCA (variação %)\n9 9 9\n");
        let extractor = ReportExtractor::new(&["IPCA"]).unwrap();

        let records = collect_reports(dir.path(), 10, &TextFileDecoder, &extractor);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].report_date, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(records[1].report_date, NaiveDate::from_ymd_opt(2025, 1, 3));
        assert_eq!(records[0].variables["IPCA"].current.as_deref(), Some("5.0"));
        assert!(records.iter().all(|r| r.report_date.is_some()));
    }

    #[test]
    fn undated_files_still_count_against_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Rz.pdf", "");
        touch(dir.path(), "R20250110.pdf", "");
        touch(dir.path(), "R20250103.pdf", "");
        let extractor = ReportExtractor::new(&["IPCA"]).unwrap();

        let records = collect_reports(dir.path(), 2, &TextFileDecoder, &extractor);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].report_date, NaiveDate::from_ymd_opt(2025, 1, 10));
    }

    #[test]
    fn decode_failure_keeps_an_empty_record() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "R20250110.pdf", "CORRUPT");
        touch(dir.path(), "R20250103.pdf", "IPCA (variação %)\n4.9\n");
        let extractor = ReportExtractor::new(&["IPCA"]).unwrap();

        let records = collect_reports(dir.path(), 10, &TextFileDecoder, &extractor);

        assert_eq!(records.len(), 2);
        assert!(records[0].variables.is_empty());
        assert_eq!(records[0].report_date, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(records[1].variables.len(), 1);
    }

    #[test]
    fn never_returns_more_than_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=28 {
            touch(dir.path(), &format!("R202502{day:02}.pdf"), "PIB Total\n2.0\n");
        }
        let extractor = ReportExtractor::new(&["PIB Total"]).unwrap();

        let records = collect_reports(dir.path(), 10, &TextFileDecoder, &extractor);

        assert_eq!(records.len(), 10);
        assert_eq!(records[0].report_date, NaiveDate::from_ymd_opt(2025, 2, 28));
    }
}
