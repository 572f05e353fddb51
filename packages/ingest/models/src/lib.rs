#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report, reading, evolution, and snapshot types for Focus report
//! extraction.
//!
//! These types define the JSON snapshot consumed by the dashboard. Field
//! names on the wire are Portuguese (`data_relatorio`, `variaveis`, ...)
//! to stay compatible with the existing fallback file; the Rust field names
//! describe what each value means.

pub mod format;

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// Economic indicators tracked across reports, in report order.
pub const TRACKED_VARIABLES: [&str; 12] = [
    "IPCA",
    "IGP-M",
    "IGP-DI",
    "IPC-Fipe",
    "Taxa de câmbio",
    "Meta Taxa Selic",
    "PIB Total",
    "Produção industrial",
    "Conta corrente",
    "Investimento direto no país",
    "Dívida líquida do setor público",
    "Resultado primário",
];

/// Up to three projections for one variable in one report.
///
/// Values are kept as the exact numeric tokens found on the data line so the
/// snapshot can be audited against [`Self::raw_line`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableReading {
    /// Projection for the current year.
    #[serde(rename = "atual")]
    pub current: Option<String>,
    /// Projection for next year.
    #[serde(rename = "proximo_ano")]
    pub next_year: Option<String>,
    /// Projection for two years ahead.
    #[serde(rename = "dois_anos")]
    pub two_years: Option<String>,
    /// The matched data line, verbatim (trimmed).
    #[serde(rename = "linha_completa")]
    pub raw_line: String,
}

impl VariableReading {
    /// Builds a reading from positional numeric tokens.
    ///
    /// Returns `None` when `tokens` is empty. Tokens past the third are
    /// ignored.
    #[must_use]
    pub fn from_tokens(tokens: &[&str], raw_line: &str) -> Option<Self> {
        let first = tokens.first()?;
        Some(Self {
            current: Some((*first).to_owned()),
            next_year: tokens.get(1).map(|s| (*s).to_owned()),
            two_years: tokens.get(2).map(|s| (*s).to_owned()),
            raw_line: raw_line.to_owned(),
        })
    }
}

/// Everything extracted from a single report file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Report date taken from the file name, if it could be parsed.
    #[serde(rename = "data_relatorio", with = "format::optional_date")]
    pub report_date: Option<NaiveDate>,
    /// Readings keyed by variable name. Variables that were not found are
    /// absent.
    #[serde(rename = "variaveis", with = "format::tracked_order")]
    pub variables: BTreeMap<String, VariableReading>,
}

impl ReportRecord {
    /// Creates a record with no readings.
    #[must_use]
    pub const fn empty(report_date: Option<NaiveDate>) -> Self {
        Self {
            report_date,
            variables: BTreeMap::new(),
        }
    }
}

/// Coarse direction of a variable between its oldest and latest reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
pub enum Trend {
    /// Latest value above the oldest.
    #[strum(serialize = "alta")]
    Rising,
    /// Latest value below the oldest.
    #[strum(serialize = "baixa")]
    Falling,
    /// Latest value equal to the oldest.
    #[strum(serialize = "estável")]
    Stable,
    /// Fewer than two observations. Serialized as `null`.
    #[strum(serialize = "desconhecida")]
    Unknown,
}

impl Serialize for Trend {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unknown => s.serialize_none(),
            other => s.serialize_str(other.as_ref()),
        }
    }
}

impl<'de> Deserialize<'de> for Trend {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Option::<String>::deserialize(d)?.map_or(Ok(Self::Unknown), |s| {
            s.parse()
                .map_err(|e| serde::de::Error::custom(format!("invalid trend '{s}': {e}")))
        })
    }
}

/// Historical series for one variable across a batch of reports.
///
/// All four sequences are index-aligned and newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableEvolution {
    /// Dates of the reports that contained this variable.
    #[serde(rename = "datas", with = "format::date_list")]
    pub dates: Vec<NaiveDate>,
    /// Current-year projections.
    #[serde(rename = "valores_atual")]
    pub current: Vec<Option<f64>>,
    /// Next-year projections.
    #[serde(rename = "valores_proximo_ano")]
    pub next_year: Vec<Option<f64>>,
    /// Two-years-ahead projections.
    #[serde(rename = "valores_dois_anos")]
    pub two_years: Vec<Option<f64>>,
    /// Direction between the oldest and latest current-year projection.
    #[serde(rename = "tendencia")]
    pub trend: Trend,
    /// Percentage change from the oldest to the latest current-year
    /// projection.
    #[serde(rename = "variacao_percentual")]
    pub percent_change: Option<f64>,
}

impl Default for VariableEvolution {
    fn default() -> Self {
        Self {
            dates: Vec::new(),
            current: Vec::new(),
            next_year: Vec::new(),
            two_years: Vec::new(),
            trend: Trend::Unknown,
            percent_change: None,
        }
    }
}

impl VariableEvolution {
    /// Number of observations in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns `true` if the variable was never observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The most recent non-null current-year projection.
    #[must_use]
    pub fn latest_current(&self) -> Option<f64> {
        self.current.iter().flatten().copied().next()
    }
}

/// The complete output of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Local time the snapshot was generated.
    #[serde(rename = "ultima_atualizacao", with = "format::timestamp")]
    pub generated_at: NaiveDateTime,
    /// Processed reports, most recent first.
    #[serde(rename = "relatorios")]
    pub reports: Vec<ReportRecord>,
    /// Evolution keyed by variable name; one entry per tracked variable,
    /// written in [`TRACKED_VARIABLES`] order.
    #[serde(rename = "evolucao", with = "format::tracked_order")]
    pub evolution: BTreeMap<String, VariableEvolution>,
}
