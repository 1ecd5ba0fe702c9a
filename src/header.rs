//! Declared-header resolution for the fixed 14-column layout.
//!
//! Matches the header row an export declares against every known locale's
//! labels. A header that names each canonical column exactly once is mapped
//! by name; anything else falls back to positional mapping, with the
//! disagreement ignored, logged or rejected according to [`HeaderCheck`].

use crate::config::{HeaderCheck, Locale};
use crate::constants::{MONTHS, STATUS_COLUMN, WIDE_COLUMN_COUNT, YEAR_COLUMN};
use crate::error::{ReshapeError, Result};
use crate::models::{MappingStrategy, WideRecord};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Column mapping from canonical positions to source columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// `source_index[canonical] = declared column`
    source_index: [usize; WIDE_COLUMN_COUNT],
    pub strategy: MappingStrategy,
    /// Locale whose labels the declared header uses, when it uses only one
    pub locale: Option<Locale>,
}

impl ColumnMapping {
    /// Identity mapping
    pub fn positional() -> Self {
        Self {
            source_index: std::array::from_fn(|i| i),
            strategy: MappingStrategy::Positional,
            locale: None,
        }
    }

    /// Resolve the declared header against the canonical layout
    pub fn resolve(declared: &[Option<String>], path: &Path, check: HeaderCheck) -> Result<Self> {
        if declared.len() != WIDE_COLUMN_COUNT {
            return Err(ReshapeError::SchemaMismatch {
                expected: WIDE_COLUMN_COUNT,
                found: declared.len(),
            });
        }

        if let Some(mapping) = Self::by_name(declared) {
            match mapping.strategy {
                MappingStrategy::ByNameReordered => info!(
                    "Declared header in {} is out of canonical order, columns mapped by name",
                    path.display()
                ),
                _ => debug!("Declared header in {} matches canonical layout", path.display()),
            }
            return Ok(mapping);
        }

        let details = describe_disagreement(declared);
        match check {
            HeaderCheck::Off => {
                debug!("Header check disabled, mapping {} positionally", path.display());
            }
            HeaderCheck::Warn => {
                warn!(
                    "Declared header in {} disagrees with the fixed column order, mapping positionally: {}",
                    path.display(),
                    details
                );
            }
            HeaderCheck::Strict => {
                return Err(ReshapeError::HeaderMismatch {
                    path: path.to_path_buf(),
                    details,
                });
            }
        }

        Ok(Self::positional())
    }

    /// Name-based mapping, if every canonical column is named exactly once
    fn by_name(declared: &[Option<String>]) -> Option<Self> {
        let lookup = label_lookup();
        let mut source_index = [usize::MAX; WIDE_COLUMN_COUNT];
        let mut locales = Vec::with_capacity(Locale::ALL.len());

        for (source, label) in declared.iter().enumerate() {
            let (canonical, locale) = *lookup.get(&normalize_label(label.as_deref()?))?;
            if source_index[canonical] != usize::MAX {
                return None;
            }
            source_index[canonical] = source;
            if !locales.contains(&locale) {
                locales.push(locale);
            }
        }

        let strategy = if source_index.iter().enumerate().all(|(i, s)| i == *s) {
            MappingStrategy::ByNameInOrder
        } else {
            MappingStrategy::ByNameReordered
        };

        Some(Self {
            source_index,
            strategy,
            locale: match locales.as_slice() {
                [locale] => Some(*locale),
                _ => None,
            },
        })
    }

    /// Source column holding the status value
    pub fn status_source(&self) -> usize {
        self.source_index[STATUS_COLUMN]
    }

    /// Reorder a raw row into a [`WideRecord`]
    pub fn project(&self, row: &[Option<String>]) -> WideRecord {
        let cell = |canonical: usize| row.get(self.source_index[canonical]).cloned().flatten();

        WideRecord {
            status: cell(STATUS_COLUMN),
            year: cell(YEAR_COLUMN),
            month_values: std::array::from_fn(|month| cell(month + 1)),
        }
    }
}

/// Normalized header label: trimmed, lower-cased
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Every known label of every locale, mapped to its canonical position
fn label_lookup() -> HashMap<String, (usize, Locale)> {
    let mut lookup = HashMap::new();
    for locale in Locale::ALL {
        lookup.insert(normalize_label(locale.status_header()), (STATUS_COLUMN, locale));
        lookup.insert(normalize_label(locale.year_header()), (YEAR_COLUMN, locale));
        for (index, month) in MONTHS.iter().enumerate() {
            lookup.insert(normalize_label(locale.month_name(*month)), (index + 1, locale));
        }
    }
    debug_assert_eq!(lookup.len(), Locale::ALL.len() * WIDE_COLUMN_COUNT);
    lookup
}

fn expected_labels(position: usize) -> String {
    Locale::ALL
        .iter()
        .map(|locale| format!("'{}'", locale.canonical_header()[position]))
        .collect::<Vec<_>>()
        .join("/")
}

fn describe_disagreement(declared: &[Option<String>]) -> String {
    let lookup = label_lookup();
    let mismatches: Vec<String> = declared
        .iter()
        .enumerate()
        .filter(|(position, label)| {
            let resolved = label
                .as_deref()
                .and_then(|l| lookup.get(&normalize_label(l)))
                .map(|(canonical, _)| *canonical);
            resolved != Some(*position)
        })
        .map(|(position, label)| {
            format!(
                "column {}: declared '{}', expected {}",
                position + 1,
                label.as_deref().unwrap_or(""),
                expected_labels(position)
            )
        })
        .collect();

    mismatches.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(labels: &[&str]) -> Vec<Option<String>> {
        labels
            .iter()
            .map(|l| if l.is_empty() { None } else { Some(l.to_string()) })
            .collect()
    }

    fn english_header() -> Vec<Option<String>> {
        header(&Locale::English.canonical_header())
    }

    #[test]
    fn test_canonical_header_maps_in_order() {
        let mapping =
            ColumnMapping::resolve(&english_header(), Path::new("in.csv"), HeaderCheck::Strict)
                .unwrap();
        assert_eq!(mapping.strategy, MappingStrategy::ByNameInOrder);
        assert_eq!(mapping, ColumnMapping {
            strategy: MappingStrategy::ByNameInOrder,
            locale: Some(Locale::English),
            ..ColumnMapping::positional()
        });
    }

    #[test]
    fn test_labels_are_case_and_whitespace_insensitive() {
        let mut labels = english_header();
        labels[0] = Some("  Status ".to_string());
        labels[13] = Some("YEAR".to_string());
        let mapping =
            ColumnMapping::resolve(&labels, Path::new("in.csv"), HeaderCheck::Strict).unwrap();
        assert_eq!(mapping.strategy, MappingStrategy::ByNameInOrder);
    }

    #[test]
    fn test_russian_header_maps_by_name() {
        let labels = header(&Locale::Russian.canonical_header());
        let mapping =
            ColumnMapping::resolve(&labels, Path::new("in.csv"), HeaderCheck::Strict).unwrap();
        assert_eq!(mapping.strategy, MappingStrategy::ByNameInOrder);
        assert_eq!(mapping.locale, Some(Locale::Russian));
    }

    #[test]
    fn test_mixed_locale_header_has_no_detected_locale() {
        let mut labels = header(&Locale::Russian.canonical_header());
        labels[0] = Some("status".to_string());
        let mapping =
            ColumnMapping::resolve(&labels, Path::new("in.csv"), HeaderCheck::Strict).unwrap();
        assert_eq!(mapping.strategy, MappingStrategy::ByNameInOrder);
        assert_eq!(mapping.locale, None);
    }

    #[test]
    fn test_reordered_header_maps_by_name() {
        // year first, status last
        let mut labels = english_header();
        labels.swap(0, 13);
        let mapping =
            ColumnMapping::resolve(&labels, Path::new("in.csv"), HeaderCheck::Strict).unwrap();
        assert_eq!(mapping.strategy, MappingStrategy::ByNameReordered);
        assert_eq!(mapping.status_source(), 13);

        let mut row: Vec<Option<String>> = vec![None; 14];
        row[0] = Some("2020".to_string());
        row[1] = Some("5".to_string());
        row[13] = Some("won".to_string());
        let record = mapping.project(&row);
        assert_eq!(record.status.as_deref(), Some("won"));
        assert_eq!(record.year.as_deref(), Some("2020"));
        assert_eq!(record.month_values[0].as_deref(), Some("5"));
    }

    #[test]
    fn test_unknown_labels_fall_back_to_positional() {
        let mut labels = english_header();
        labels[3] = Some("mars".to_string());
        let mapping =
            ColumnMapping::resolve(&labels, Path::new("in.csv"), HeaderCheck::Warn).unwrap();
        assert_eq!(mapping.strategy, MappingStrategy::Positional);
    }

    #[test]
    fn test_missing_label_falls_back_to_positional() {
        let mut labels = english_header();
        labels[0] = None;
        let mapping =
            ColumnMapping::resolve(&labels, Path::new("in.csv"), HeaderCheck::Off).unwrap();
        assert_eq!(mapping.strategy, MappingStrategy::Positional);
    }

    #[test]
    fn test_duplicated_label_falls_back_to_positional() {
        let mut labels = english_header();
        labels[2] = Some("january".to_string());
        let mapping =
            ColumnMapping::resolve(&labels, Path::new("in.csv"), HeaderCheck::Warn).unwrap();
        assert_eq!(mapping.strategy, MappingStrategy::Positional);
    }

    #[test]
    fn test_strict_check_rejects_unresolved_header() {
        let mut labels = english_header();
        labels[3] = Some("mars".to_string());
        let result = ColumnMapping::resolve(&labels, Path::new("in.csv"), HeaderCheck::Strict);
        match result {
            Err(ReshapeError::HeaderMismatch { details, .. }) => {
                assert!(details.contains("column 4: declared 'mars'"));
                assert!(details.contains("'march'/'март'"));
            }
            other => panic!("Expected HeaderMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_width_is_schema_mismatch() {
        let labels = header(&["status", "january", "year"]);
        let result = ColumnMapping::resolve(&labels, Path::new("in.csv"), HeaderCheck::Off);
        assert!(matches!(
            result,
            Err(ReshapeError::SchemaMismatch {
                expected: 14,
                found: 3
            })
        ));
    }

    #[test]
    fn test_positional_projection_pads_short_rows() {
        let row = vec![Some("won".to_string()), Some("5".to_string())];
        let record = ColumnMapping::positional().project(&row);
        assert_eq!(record.status.as_deref(), Some("won"));
        assert_eq!(record.month_values[0].as_deref(), Some("5"));
        assert_eq!(record.month_values[1], None);
        assert_eq!(record.year, None);
    }
}
