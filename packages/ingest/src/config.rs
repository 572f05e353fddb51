//! Run configuration.
//!
//! Settings are layered, lowest precedence first: built-in defaults, an
//! optional TOML file, `FOCUS_*` environment variables, then command-line
//! flags. The tracked variable list is fixed and not configurable.

use std::path::{Path, PathBuf};

use focus_report_ingest_models::TRACKED_VARIABLES;
use serde::Deserialize;

use crate::IngestError;

/// Default directory holding the `R<YYYYMMDD>.pdf` reports.
pub const DEFAULT_REPORTS_DIR: &str = "data/focus_reports";

/// Default snapshot path, also read by the dashboard as its fallback.
pub const DEFAULT_OUTPUT_FILE: &str = "data/generated/focus_data_fallback.json";

/// Default number of most recent reports to process.
pub const DEFAULT_MAX_REPORTS: usize = 10;

/// Environment variable overriding the reports directory.
pub const ENV_REPORTS_DIR: &str = "FOCUS_REPORTS_DIR";

/// Environment variable overriding the snapshot path.
pub const ENV_OUTPUT_FILE: &str = "FOCUS_OUTPUT_FILE";

/// Environment variable overriding the number of reports processed.
pub const ENV_MAX_REPORTS: &str = "FOCUS_MAX_REPORTS";

/// Resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusConfig {
    /// Directory scanned for report files.
    pub reports_dir: PathBuf,
    /// Where the snapshot is written.
    pub output_file: PathBuf,
    /// How many of the most recent report files to process.
    pub max_reports: usize,
    /// Variables extracted from each report.
    pub variables: Vec<String>,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            max_reports: DEFAULT_MAX_REPORTS,
            variables: TRACKED_VARIABLES.iter().map(|&s| s.to_owned()).collect(),
        }
    }
}

/// One layer of optional settings (a TOML file, the environment, or CLI
/// flags).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    /// Directory scanned for report files.
    pub reports_dir: Option<PathBuf>,
    /// Where the snapshot is written.
    pub output_file: Option<PathBuf>,
    /// How many of the most recent report files to process.
    pub max_reports: Option<usize>,
}

impl ConfigLayer {
    /// Parses a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Config`] if the document is not valid TOML or
    /// contains unknown keys.
    pub fn from_toml(toml_str: &str) -> Result<Self, IngestError> {
        toml::de::from_str(toml_str).map_err(|e| IngestError::Config {
            message: e.to_string(),
        })
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Io`] if the file cannot be read, or
    /// [`IngestError::Config`] if it cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, IngestError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents).map_err(|e| IngestError::Config {
            message: format!("{}: {e}", path.display()),
        })
    }

    /// Builds a layer from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Config`] if `FOCUS_MAX_REPORTS` is not a
    /// number.
    pub fn from_env() -> Result<Self, IngestError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a layer from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Config`] if the max-reports value is not a
    /// number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, IngestError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_reports = get(ENV_MAX_REPORTS)
            .map(|v| {
                v.trim().parse::<usize>().map_err(|e| IngestError::Config {
                    message: format!("{ENV_MAX_REPORTS}='{v}': {e}"),
                })
            })
            .transpose()?;

        Ok(Self {
            reports_dir: get(ENV_REPORTS_DIR).map(PathBuf::from),
            output_file: get(ENV_OUTPUT_FILE).map(PathBuf::from),
            max_reports,
        })
    }
}

impl FocusConfig {
    /// Applies `layer` on top of the current settings.
    #[must_use]
    pub fn with_layer(mut self, layer: ConfigLayer) -> Self {
        if let Some(dir) = layer.reports_dir {
            self.reports_dir = dir;
        }
        if let Some(file) = layer.output_file {
            self.output_file = file;
        }
        if let Some(max) = layer.max_reports {
            self.max_reports = max;
        }
        self
    }

    /// Resolves the configuration from an optional TOML file, the process
    /// environment, and command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the file cannot be read or parsed, an
    /// environment value is malformed, or the result is invalid.
    pub fn load(config_file: Option<&Path>, cli: ConfigLayer) -> Result<Self, IngestError> {
        let mut config = Self::default();

        if let Some(path) = config_file {
            log::debug!("Loading configuration from {}", path.display());
            config = config.with_layer(ConfigLayer::from_file(path)?);
        }

        config = config.with_layer(ConfigLayer::from_env()?).with_layer(cli);
        config.validate()?;

        Ok(config)
    }

    /// Checks that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Config`] if `max_reports` is zero.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.max_reports == 0 {
            return Err(IngestError::Config {
                message: "max_reports must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}
