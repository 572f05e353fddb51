//! Evolution series and two-point trends.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use focus_report_ingest_models::{ReportRecord, Trend, VariableEvolution};

/// Converts a raw numeric token to a number.
///
/// Missing, empty, unparseable, and non-finite values all become `None`.
#[must_use]
pub fn parse_value(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        Ok(_) | Err(_) => {
            log::debug!("Discarding non-numeric value '{raw}'");
            None
        }
    }
}

/// Classifies the movement of a newest-first series.
///
/// Only the newest and oldest non-null values are compared; everything in
/// between is ignored. Returns [`Trend::Unknown`] and no percentage with
/// fewer than two values. The percentage is relative to the magnitude of
/// the oldest value, and `0.0` when the oldest value is zero.
#[must_use]
pub fn compute_trend(series: &[Option<f64>]) -> (Trend, Option<f64>) {
    let mut values = series.iter().flatten().copied();
    let Some(latest) = values.next() else {
        return (Trend::Unknown, None);
    };
    let Some(oldest) = values.last() else {
        return (Trend::Unknown, None);
    };

    let trend = match latest.partial_cmp(&oldest) {
        Some(Ordering::Greater) => Trend::Rising,
        Some(Ordering::Less) => Trend::Falling,
        Some(Ordering::Equal) | None => Trend::Stable,
    };

    let percent_change = if oldest == 0.0 {
        0.0
    } else {
        (latest - oldest) / oldest.abs() * 100.0
    };

    (trend, Some(percent_change))
}

/// Builds the evolution of every variable in `variables` across `reports`.
///
/// `reports` must be ordered most recent first; the series keep that order.
/// A report contributes to a variable's series only if it holds a reading
/// for it, so series lengths can differ between variables. Reports without
/// a date are skipped. Variables never observed still get an entry with
/// empty series and an unknown trend.
#[must_use]
pub fn analyze_evolution<S: AsRef<str>>(
    reports: &[ReportRecord],
    variables: &[S],
) -> BTreeMap<String, VariableEvolution> {
    let mut evolution: BTreeMap<String, VariableEvolution> = variables
        .iter()
        .map(|name| (name.as_ref().to_owned(), VariableEvolution::default()))
        .collect();

    for report in reports {
        let Some(date) = report.report_date else {
            log::debug!("Skipping undated report in evolution analysis");
            continue;
        };

        for (name, reading) in &report.variables {
            let Some(series) = evolution.get_mut(name) else {
                continue;
            };
            series.dates.push(date);
            series.current.push(parse_value(reading.current.as_deref()));
            series.next_year.push(parse_value(reading.next_year.as_deref()));
            series.two_years.push(parse_value(reading.two_years.as_deref()));
        }
    }

    for (name, series) in &mut evolution {
        let (trend, percent_change) = compute_trend(&series.current);
        series.trend = trend;
        series.percent_change = percent_change;

        log::debug!(
            "{name}: {} observation(s), trend {trend}, change {percent_change:?}",
            series.len()
        );
    }

    evolution
}
