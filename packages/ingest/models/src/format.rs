//! Serde helpers for the `DD/MM/YYYY` dates and `DD/MM/YYYY HH:MM:SS`
//! timestamps used throughout the snapshot file, and for writing
//! variable-keyed maps in report order.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TRACKED_VARIABLES;

/// Date format used for report dates (`DD/MM/YYYY`).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Timestamp format used for the snapshot generation time.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Renders a date as `DD/MM/YYYY`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date<E: serde::de::Error>(s: &str) -> Result<NaiveDate, E> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| E::custom(format!("invalid date '{s}': {e}")))
}

/// `#[serde(with = ...)]` module for an optional `DD/MM/YYYY` date.
pub mod optional_date {
    use super::{Deserialize, Deserializer, NaiveDate, Serializer, format_date, parse_date};

    /// Serializes `Some(date)` as `"DD/MM/YYYY"` and `None` as `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => s.serialize_some(&format_date(*date)),
            None => s.serialize_none(),
        }
    }

    /// Deserializes a nullable `"DD/MM/YYYY"` string.
    ///
    /// # Errors
    ///
    /// Fails if the string is not a valid `DD/MM/YYYY` date.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        Option::<String>::deserialize(d)?
            .as_deref()
            .map(parse_date)
            .transpose()
    }
}

/// `#[serde(with = ...)]` module for a list of `DD/MM/YYYY` dates.
pub mod date_list {
    use super::{Deserialize, Deserializer, NaiveDate, Serializer, format_date, parse_date};

    /// Serializes each date as `"DD/MM/YYYY"`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(dates: &[NaiveDate], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(dates.iter().map(|d| format_date(*d)))
    }

    /// Deserializes a list of `"DD/MM/YYYY"` strings.
    ///
    /// # Errors
    ///
    /// Fails if any entry is not a valid `DD/MM/YYYY` date.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<NaiveDate>, D::Error> {
        Vec::<String>::deserialize(d)?
            .iter()
            .map(|s| parse_date(s))
            .collect()
    }
}

/// `#[serde(with = ...)]` module for a `DD/MM/YYYY HH:MM:SS` timestamp.
pub mod timestamp {
    use super::{Deserialize, Deserializer, NaiveDateTime, Serializer, TIMESTAMP_FORMAT};

    /// Serializes the timestamp as `"DD/MM/YYYY HH:MM:SS"`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Deserializes a `"DD/MM/YYYY HH:MM:SS"` string.
    ///
    /// # Errors
    ///
    /// Fails if the string does not match the timestamp format.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT)
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{s}': {e}")))
    }
}

/// `#[serde(with = ...)]` module for maps keyed by variable name.
///
/// Entries are written in [`TRACKED_VARIABLES`] order; names outside that
/// list follow in alphabetical order.
pub mod tracked_order {
    use serde::ser::SerializeMap as _;

    use super::{BTreeMap, Deserialize, Deserializer, Serialize, Serializer, TRACKED_VARIABLES};

    fn rank(name: &str) -> usize {
        TRACKED_VARIABLES
            .iter()
            .position(|&tracked| tracked == name)
            .unwrap_or(TRACKED_VARIABLES.len())
    }

    /// Serializes `map` in report order.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<V: Serialize, S: Serializer>(
        map: &BTreeMap<String, V>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<(&String, &V)> = map.iter().collect();
        entries.sort_by_key(|(name, _)| rank(name));

        let mut out = s.serialize_map(Some(entries.len()))?;
        for (name, value) in entries {
            out.serialize_entry(name, value)?;
        }
        out.end()
    }

    /// Deserializes a variable-keyed map.
    ///
    /// # Errors
    ///
    /// Propagates deserializer errors.
    pub fn deserialize<'de, V: Deserialize<'de>, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<String, V>, D::Error> {
        BTreeMap::deserialize(d)
    }
}
