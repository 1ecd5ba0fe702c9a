//! Configuration management and validation.
//!
//! Provides the pipeline configuration: which export locale the input uses,
//! how strictly the declared header is checked against the fixed column
//! order, which status labels the aggregations look for, and where the
//! report tables go.

use crate::constants::{self, english, russian};
use crate::error::{ReshapeError, Result};
use chrono::Month;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Language of the export's header row and status labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
pub enum Locale {
    #[default]
    English,
    Russian,
}

impl Locale {
    /// Every supported locale, used to build the header lookup table
    pub const ALL: [Locale; 2] = [Locale::English, Locale::Russian];

    /// Header label of the status column
    pub fn status_header(&self) -> &'static str {
        match self {
            Locale::English => english::STATUS_HEADER,
            Locale::Russian => russian::STATUS_HEADER,
        }
    }

    /// Header label of the year column
    pub fn year_header(&self) -> &'static str {
        match self {
            Locale::English => english::YEAR_HEADER,
            Locale::Russian => russian::YEAR_HEADER,
        }
    }

    /// Month name used both as a header label and inside month keys
    pub fn month_name(&self, month: Month) -> &'static str {
        let index = month.number_from_month() as usize - 1;
        match self {
            Locale::English => english::MONTH_NAMES[index],
            Locale::Russian => russian::MONTH_NAMES[index],
        }
    }

    /// Calendar month named by `name` in any supported locale
    pub fn month_from_name(name: &str) -> Option<Month> {
        Locale::ALL.iter().find_map(|locale| {
            constants::MONTHS
                .iter()
                .find(|month| locale.month_name(**month) == name)
                .copied()
        })
    }

    /// The canonical 14-column header for this locale
    pub fn canonical_header(&self) -> Vec<&'static str> {
        let mut header = Vec::with_capacity(constants::WIDE_COLUMN_COUNT);
        header.push(self.status_header());
        header.extend(constants::MONTHS.iter().map(|m| self.month_name(*m)));
        header.push(self.year_header());
        header
    }

    /// Default status labels of exports written in this locale
    pub fn default_status_labels(&self) -> StatusLabels {
        match self {
            Locale::English => StatusLabels::new(
                english::STATUS_WON,
                english::STATUS_LOST,
                english::STATUS_REJECTED,
            ),
            Locale::Russian => StatusLabels::new(
                russian::STATUS_WON,
                russian::STATUS_LOST,
                russian::STATUS_REJECTED,
            ),
        }
    }
}

/// What to do when the declared header cannot be resolved by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum HeaderCheck {
    /// Map positionally without comment
    Off,
    /// Map positionally and log the disagreement
    #[default]
    Warn,
    /// Refuse to load the file
    Strict,
}

/// Status values the aggregations filter on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLabels {
    pub won: String,
    pub lost: String,
    pub rejected: String,
}

impl StatusLabels {
    pub fn new(won: impl Into<String>, lost: impl Into<String>, rejected: impl Into<String>) -> Self {
        Self {
            won: won.into(),
            lost: lost.into(),
            rejected: rejected.into(),
        }
    }
}

impl Default for StatusLabels {
    fn default() -> Self {
        Locale::default().default_status_labels()
    }
}

/// Global configuration for a reshaping run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Locale of the export (month names, header labels)
    pub locale: Locale,

    /// Prefer the locale a by-name header resolves to over `locale`
    pub detect_locale: bool,

    /// Header disagreement policy
    pub header_check: HeaderCheck,

    /// Status labels used by the win/loss/rejection aggregations
    pub status_labels: StatusLabels,

    /// Directory for exported aggregation tables
    pub output_dir: PathBuf,

    /// Write aggregation tables after reshaping
    pub write_report: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            detect_locale: true,
            header_check: HeaderCheck::default(),
            status_labels: StatusLabels::default(),
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            write_report: true,
        }
    }
}

impl PipelineConfig {
    /// Pin the locale, resetting status labels to that locale's defaults
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self.detect_locale = false;
        self.status_labels = locale.default_status_labels();
        self
    }

    /// Status labels for an export written in `locale`.
    ///
    /// Labels left at the configured locale's defaults follow the export's
    /// locale; explicitly set labels are kept.
    pub fn status_labels_for(&self, locale: Locale) -> StatusLabels {
        if self.status_labels == self.locale.default_status_labels() {
            locale.default_status_labels()
        } else {
            self.status_labels.clone()
        }
    }

    pub fn with_header_check(mut self, header_check: HeaderCheck) -> Self {
        self.header_check = header_check;
        self
    }

    pub fn with_status_labels(mut self, status_labels: StatusLabels) -> Self {
        self.status_labels = status_labels;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Skip writing the aggregation tables
    pub fn without_report(mut self) -> Self {
        self.write_report = false;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let labels = &self.status_labels;
        for (name, value) in [
            ("won", &labels.won),
            ("lost", &labels.lost),
            ("rejected", &labels.rejected),
        ] {
            if value.trim().is_empty() {
                return Err(ReshapeError::Configuration {
                    message: format!("Status label '{}' must not be empty", name),
                });
            }
        }

        if labels.won == labels.lost {
            return Err(ReshapeError::Configuration {
                message: format!("Won and lost status labels are both '{}'", labels.won),
            });
        }

        if self.write_report && self.output_dir.as_os_str().is_empty() {
            return Err(ReshapeError::Configuration {
                message: "Output directory must not be empty when writing a report".to_string(),
            });
        }

        debug!(
            "Configuration validated: locale={:?}, detect_locale={}, header_check={:?}",
            self.locale, self.detect_locale, self.header_check
        );
        Ok(())
    }
}
