//! Wide-table loading from auction CSV exports.
//!
//! Reads the export in one blocking read, drops blank rows and re-emitted
//! header rows, resolves the declared header to the canonical 14-column
//! layout and yields one [`WideRecord`] per surviving row. Cell values stay
//! textual; numeric interpretation is the reshaper's job.

use crate::config::{Locale, PipelineConfig};
use crate::constants::WIDE_COLUMN_COUNT;
use crate::error::{ReshapeError, Result};
use crate::header::ColumnMapping;
use crate::models::{LoadStats, MappingStrategy, WideRecord, WideTable};
use polars::prelude::*;
use std::fs;
use std::io::{Cursor, ErrorKind};
use std::path::Path;
use tracing::{debug, info};

type RawRow = Vec<Option<String>>;

/// Load the wide table from a CSV export
pub fn load_wide_table(path: &Path, config: &PipelineConfig) -> Result<WideTable> {
    if !path.is_file() {
        return Err(ReshapeError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => ReshapeError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ReshapeError::Io(e),
    })?;
    let text = std::str::from_utf8(&bytes).map_err(|e| ReshapeError::InvalidFormat {
        path: path.to_path_buf(),
        reason: format!("input is not valid UTF-8: {}", e),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if text.trim().is_empty() {
        return Err(ReshapeError::EmptyData {
            path: path.to_path_buf(),
        });
    }

    let rows = read_raw_rows(text, path)?;
    let Some((declared, data_rows)) = rows.split_first() else {
        return Err(ReshapeError::EmptyData {
            path: path.to_path_buf(),
        });
    };
    let raw_rows = data_rows.len();

    // Step 1: drop fully blank rows
    let non_blank: Vec<&RawRow> = data_rows
        .iter()
        .filter(|row| row.iter().any(Option::is_some))
        .collect();
    let blank_rows_dropped = raw_rows - non_blank.len();

    if non_blank.is_empty() {
        return Err(ReshapeError::EmptyData {
            path: path.to_path_buf(),
        });
    }

    // Step 2: resolve the declared header
    let mapping = ColumnMapping::resolve(declared, path, config.header_check)?;
    let locale = resolve_locale(&mapping, config);

    // Step 3: drop header rows re-emitted mid-file
    let header_labels = duplicate_header_labels(declared, &mapping, locale);
    let status_source = mapping.status_source();
    let surviving: Vec<&RawRow> = non_blank
        .into_iter()
        .filter(|row| {
            !matches!(
                row.get(status_source),
                Some(Some(status)) if header_labels.iter().any(|label| label == status)
            )
        })
        .collect();
    let duplicate_headers_dropped = raw_rows - blank_rows_dropped - surviving.len();

    if surviving.is_empty() {
        return Err(ReshapeError::EmptyData {
            path: path.to_path_buf(),
        });
    }

    // Step 4: normalize to the canonical layout, reindexed from zero
    let records: Vec<WideRecord> = surviving.iter().map(|row| mapping.project(row)).collect();

    debug!(
        "Dropped {} blank rows and {} duplicate header rows from {}",
        blank_rows_dropped,
        duplicate_headers_dropped,
        path.display()
    );
    info!(
        "Loaded {} wide rows from {} ({:?} column mapping)",
        records.len(),
        path.display(),
        mapping.strategy
    );

    Ok(WideTable {
        records,
        locale,
        stats: LoadStats {
            raw_rows,
            blank_rows_dropped,
            duplicate_headers_dropped,
            mapping: mapping.strategy,
        },
    })
}

/// Parse every line, declared header included, as text cells
fn read_raw_rows(text: &str, path: &Path) -> Result<Vec<RawRow>> {
    let mut cursor = Cursor::new(text.as_bytes());
    let options = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(Some(0));
    let df = CsvReader::new(&mut cursor)
        .with_options(options)
        .finish()
        .map_err(|e| {
            let reason = e.to_string();
            if reason.contains("found more fields") {
                ReshapeError::SchemaMismatch {
                    expected: WIDE_COLUMN_COUNT,
                    found: widest_row(text),
                }
            } else {
                ReshapeError::InvalidFormat {
                    path: path.to_path_buf(),
                    reason,
                }
            }
        })?;

    if df.width() != WIDE_COLUMN_COUNT {
        return Err(ReshapeError::SchemaMismatch {
            expected: WIDE_COLUMN_COUNT,
            found: df.width(),
        });
    }

    let columns = df
        .get_columns()
        .iter()
        .map(|column| column.str())
        .collect::<PolarsResult<Vec<_>>>()?;

    let rows = (0..df.height())
        .map(|row| columns.iter().map(|column| clean_cell(column.get(row))).collect())
        .collect();

    Ok(rows)
}

/// Field count of the widest record, honouring quoted separators
fn widest_row(text: &str) -> usize {
    let mut widest = 0;
    let mut fields = 1;
    let mut quoted = false;

    for c in text.chars() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => fields += 1,
            '\n' if !quoted => {
                widest = widest.max(fields);
                fields = 1;
            }
            _ => {}
        }
    }
    widest.max(fields)
}

/// Locale the export is written in
fn resolve_locale(mapping: &ColumnMapping, config: &PipelineConfig) -> Locale {
    match mapping.locale {
        Some(detected) if config.detect_locale => {
            if detected != config.locale {
                info!("Header labels are {:?}, using that locale", detected);
            }
            detected
        }
        _ => config.locale,
    }
}

/// Null or whitespace-only cells count as missing
fn clean_cell(raw: Option<&str>) -> Option<String> {
    raw.filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

/// Status-column values that mark a re-emitted header row.
///
/// The declared status label only counts when the header was recognised by
/// name; a positionally mapped file may have no header at all, and its first
/// status value is real data.
fn duplicate_header_labels(
    declared: &[Option<String>],
    mapping: &ColumnMapping,
    locale: Locale,
) -> Vec<String> {
    let mut labels = vec![locale.status_header().to_string()];
    if mapping.strategy != MappingStrategy::Positional {
        if let Some(Some(declared_status)) = declared.get(mapping.status_source()) {
            if !labels.contains(declared_status) {
                labels.push(declared_status.clone());
            }
        }
    }
    labels
}
