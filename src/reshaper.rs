//! Wide-to-long reshaping.
//!
//! Walks every wide row in input order and every month in calendar order,
//! classifying each cell as a [`MonthCell`]. Only counts become
//! [`LongRecord`]s; missing and not-applicable cells are tallied and skipped.

use crate::constants::MONTHS;
use crate::models::{LongRecord, LongTable, MonthCell, ReshapeStats, WideTable};
use tracing::{debug, info};

/// Reshape the wide table into long form
pub fn reshape(wide: &WideTable) -> LongTable {
    let mut records = Vec::with_capacity(wide.len() * MONTHS.len());
    let mut stats = ReshapeStats::default();

    for (row_index, row) in wide.records.iter().enumerate() {
        stats.rows_visited += 1;
        let year_label = row.year.as_deref().unwrap_or_default();

        for (month, raw) in MONTHS.iter().zip(row.month_values.iter()) {
            match classify_cell(raw.as_deref()) {
                MonthCell::Count(count) => records.push(LongRecord {
                    year: row.year.clone(),
                    month_key: format!("{}-{}", year_label, wide.locale.month_name(*month)),
                    status: row.status.clone(),
                    count,
                }),
                MonthCell::Missing => stats.cells_missing += 1,
                MonthCell::NotApplicable(value) => {
                    debug!(
                        "Skipping non-count cell '{}' at row {}, {:?}",
                        value, row_index, month
                    );
                    stats.cells_not_applicable += 1;
                }
            }
        }
    }

    stats.records_emitted = records.len();
    info!(
        "Reshaped {} wide rows into {} long records ({} missing, {} not applicable)",
        stats.rows_visited, stats.records_emitted, stats.cells_missing, stats.cells_not_applicable
    );

    LongTable { records, stats }
}

/// Classify a raw month cell.
///
/// Accepts plain non-negative integers with optional surrounding whitespace
/// and a leading `+`, and integral decimals such as `"5.0"` or `"5."`.
pub fn classify_cell(raw: Option<&str>) -> MonthCell {
    let Some(raw) = raw else {
        return MonthCell::Missing;
    };

    let value = raw.trim();
    if value.is_empty() {
        return MonthCell::Missing;
    }

    match parse_count(value) {
        Some(count) => MonthCell::Count(count),
        None => MonthCell::NotApplicable(raw.to_string()),
    }
}

fn parse_count(value: &str) -> Option<u64> {
    let unsigned = value.strip_prefix('+').unwrap_or(value);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(fraction) = fraction {
        if !fraction.bytes().all(|b| b == b'0') {
            return None;
        }
    }

    whole.parse::<u64>().ok()
}
