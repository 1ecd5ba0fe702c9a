//! Core data structures for auction reshaping.
//!
//! Defines the wide table produced by the loader, the long-form table
//! produced by the reshaper, the explicit month-cell parse result, and the
//! statistics each stage reports.

use crate::config::Locale;
use crate::constants::{MONTH_COUNT, columns};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One input row after header repair: status, twelve raw month cells, year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WideRecord {
    pub status: Option<String>,
    pub year: Option<String>,
    /// Raw month cells in calendar order, as read from the file
    pub month_values: [Option<String>; MONTH_COUNT],
}

/// How declared header columns were matched to the canonical layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingStrategy {
    /// Declared header matched the canonical labels in canonical order
    ByNameInOrder,
    /// Declared header matched the canonical labels but in another order
    ByNameReordered,
    /// Declared header could not be resolved; columns taken by position
    Positional,
}

/// Loader statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows parsed, excluding the declared header
    pub raw_rows: usize,
    pub blank_rows_dropped: usize,
    pub duplicate_headers_dropped: usize,
    pub mapping: MappingStrategy,
}

/// Wide table: one record per surviving input row, contiguous from zero
#[derive(Debug, Clone)]
pub struct WideTable {
    pub records: Vec<WideRecord>,
    pub locale: Locale,
    pub stats: LoadStats,
}

impl WideTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render as a string-typed DataFrame under the locale's canonical header
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let header = self.locale.canonical_header();
        let mut frame_columns = Vec::with_capacity(header.len());

        let statuses: Vec<Option<&str>> =
            self.records.iter().map(|r| r.status.as_deref()).collect();
        frame_columns.push(Column::new(header[0].into(), statuses));

        for month_index in 0..MONTH_COUNT {
            let values: Vec<Option<&str>> = self
                .records
                .iter()
                .map(|r| r.month_values[month_index].as_deref())
                .collect();
            frame_columns.push(Column::new(header[month_index + 1].into(), values));
        }

        let years: Vec<Option<&str>> = self.records.iter().map(|r| r.year.as_deref()).collect();
        frame_columns.push(Column::new(header[header.len() - 1].into(), years));

        Ok(DataFrame::new(frame_columns)?)
    }
}

/// Parse outcome of a single month cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthCell {
    /// Valid non-negative count
    Count(u64),
    /// Cell was null or blank
    Missing,
    /// Cell held text that is not a count; carries the raw value
    NotApplicable(String),
}

/// One (status, year, month) observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongRecord {
    pub year: Option<String>,
    /// `"{year}-{month_name}"`, e.g. `"2017-january"`
    pub month_key: String,
    pub status: Option<String>,
    pub count: u64,
}

/// Reshaper statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReshapeStats {
    pub rows_visited: usize,
    pub cells_missing: usize,
    pub cells_not_applicable: usize,
    pub records_emitted: usize,
}

/// Long-form table handed to the aggregation layer
#[derive(Debug, Clone, Default)]
pub struct LongTable {
    pub records: Vec<LongRecord>,
    pub stats: ReshapeStats,
}

impl LongTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LongRecord> {
        self.records.iter()
    }

    /// Build the `year, month_key, status, count` DataFrame
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let years: Vec<Option<&str>> = self.records.iter().map(|r| r.year.as_deref()).collect();
        let month_keys: Vec<&str> = self.records.iter().map(|r| r.month_key.as_str()).collect();
        let statuses: Vec<Option<&str>> =
            self.records.iter().map(|r| r.status.as_deref()).collect();
        let counts: Vec<u64> = self.records.iter().map(|r| r.count).collect();

        let df = df!(
            columns::YEAR => years,
            columns::MONTH_KEY => month_keys,
            columns::STATUS => statuses,
            columns::COUNT => counts
        )?;
        Ok(df)
    }
}

impl<'a> IntoIterator for &'a LongTable {
    type Item = &'a LongRecord;
    type IntoIter = std::slice::Iter<'a, LongRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
