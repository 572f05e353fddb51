#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-variable evolution and trend analysis across Focus reports.
//!
//! Folds an ordered batch of [`ReportRecord`]s into one
//! [`VariableEvolution`] per tracked variable and classifies how each
//! variable's current-year projection moved between the oldest and the most
//! recent report in the batch.
//!
//! [`ReportRecord`]: focus_report_ingest_models::ReportRecord
//! [`VariableEvolution`]: focus_report_ingest_models::VariableEvolution

pub mod evolution;

pub use evolution::{analyze_evolution, compute_trend, parse_value};
