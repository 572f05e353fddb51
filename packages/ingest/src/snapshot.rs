//! Snapshot persistence and summaries.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;
use focus_report_ingest_models::{ReportRecord, Snapshot, Trend, VariableEvolution};

use crate::IngestError;

/// Assembles a snapshot from a processed batch.
#[must_use]
pub const fn build_snapshot(
    generated_at: NaiveDateTime,
    reports: Vec<ReportRecord>,
    evolution: BTreeMap<String, VariableEvolution>,
) -> Snapshot {
    Snapshot {
        generated_at,
        reports,
        evolution,
    }
}

/// Writes `snapshot` as pretty-printed JSON, creating missing parent
/// directories.
///
/// # Errors
///
/// Returns [`IngestError`] if serialization fails or the file cannot be
/// written.
pub fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), IngestError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;

    log::debug!(
        "Wrote snapshot with {} report(s) to {}",
        snapshot.reports.len(),
        path.display()
    );

    Ok(())
}

/// Reads a snapshot previously written by [`write_snapshot`].
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read or is not a valid
/// snapshot.
pub fn read_snapshot(path: &Path) -> Result<Snapshot, IngestError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// One line of the expectations overview.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// Variable name.
    pub variable: String,
    /// Most recent current-year projection.
    pub latest: Option<f64>,
    /// Direction since the oldest report.
    pub trend: Trend,
    /// Percentage change since the oldest report.
    pub percent_change: Option<f64>,
    /// Number of reports the variable was found in.
    pub observations: usize,
}

/// Builds the overview rows for `variables`, in the given order.
///
/// Variables missing from the snapshot are reported with no observations.
#[must_use]
pub fn summarize<S: AsRef<str>>(snapshot: &Snapshot, variables: &[S]) -> Vec<SummaryRow> {
    variables
        .iter()
        .map(|name| {
            let name = name.as_ref();
            snapshot.evolution.get(name).map_or_else(
                || SummaryRow {
                    variable: name.to_owned(),
                    latest: None,
                    trend: Trend::Unknown,
                    percent_change: None,
                    observations: 0,
                },
                |evolution| SummaryRow {
                    variable: name.to_owned(),
                    latest: evolution.latest_current(),
                    trend: evolution.trend,
                    percent_change: evolution.percent_change,
                    observations: evolution.len(),
                },
            )
        })
        .collect()
}

impl std::fmt::Display for SummaryRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let latest = self
            .latest
            .map_or_else(|| "-".to_owned(), |v| format!("{v:.2}"));
        let trend = match self.trend {
            Trend::Unknown => "-".to_owned(),
            other => other.to_string(),
        };
        let change = self
            .percent_change
            .map_or_else(|| "-".to_owned(), |v| format!("{v:+.2}%"));
        write!(
            f,
            "{:<34} {latest:>10} {trend:>8} {change:>9} {:>4}",
            self.variable, self.observations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use focus_report_ingest_models::VariableReading;

    fn sample_snapshot() -> Snapshot {
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let mut report = ReportRecord::empty(Some(date));
        report.variables.insert(
            "Taxa de câmbio".to_owned(),
            VariableReading::from_tokens(&["5.90", "5.80"], "5.90 5.80").unwrap(),
        );

        let mut evolution = BTreeMap::new();
        evolution.insert(
            "Taxa de câmbio".to_owned(),
            VariableEvolution {
                dates: vec![date, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()],
                current: vec![Some(5.9), Some(5.5)],
                next_year: vec![Some(5.8), None],
                two_years: vec![None, None],
                trend: Trend::Rising,
                percent_change: Some(7.27),
            },
        );
        evolution.insert("IPCA".to_owned(), VariableEvolution::default());

        build_snapshot(
            date.and_hms_opt(9, 30, 5).unwrap(),
            vec![report],
            evolution,
        )
    }

    #[test]
    fn writes_readable_json_with_literal_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/focus.json");

        write_snapshot(&sample_snapshot(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Taxa de câmbio\""));
        assert!(text.contains("\n  \"relatorios\": ["));
        assert!(text.contains("\"ultima_atualizacao\": \"10/01/2025 09:30:05\""));

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["relatorios"][0]["data_relatorio"], "10/01/2025");
        assert_eq!(json["relatorios"][0]["variaveis"]["Taxa de câmbio"]["atual"], "5.90");
        assert!(json["relatorios"][0]["variaveis"]["Taxa de câmbio"]["dois_anos"].is_null());
        let cambio = &json["evolucao"]["Taxa de câmbio"];
        assert_eq!(cambio["datas"], serde_json::json!(["10/01/2025", "03/01/2025"]));
        assert_eq!(cambio["valores_proximo_ano"], serde_json::json!([5.8, null]));
        assert_eq!(cambio["tendencia"], "alta");
        assert!(json["evolucao"]["IPCA"]["tendencia"].is_null());
    }

    #[test]
    fn reads_back_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focus.json");
        let snapshot = sample_snapshot();

        write_snapshot(&snapshot, &path).unwrap();

        assert_eq!(read_snapshot(&path).unwrap(), snapshot);
    }

    #[test]
    fn reading_garbage_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focus.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(read_snapshot(&path), Err(IngestError::Json(_))));
    }

    #[test]
    fn summary_follows_requested_order() {
        let rows = summarize(&sample_snapshot(), &["Taxa de câmbio", "IPCA", "PIB Total"]);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].latest, Some(5.9));
        assert_eq!(rows[0].trend, Trend::Rising);
        assert_eq!(rows[0].observations, 2);
        assert_eq!(rows[1].observations, 0);
        assert_eq!(rows[2].variable, "PIB Total");
        assert_eq!(rows[2].trend, Trend::Unknown);
    }

    #[test]
    fn summary_row_renders_placeholders() {
        let rows = summarize(&sample_snapshot(), &["Taxa de câmbio", "IPCA"]);

        let cambio = rows[0].to_string();
        assert!(cambio.starts_with("Taxa de câmbio"));
        assert!(cambio.contains("5.90"));
        assert!(cambio.contains("alta"));
        assert!(cambio.contains("+7.27%"));

        let ipca = rows[1].to_string();
        assert!(ipca.contains(" - "));
    }
}
