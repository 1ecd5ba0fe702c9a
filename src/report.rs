//! Export of aggregation tables for chart renderers.
//!
//! Each [`Analysis`] query is written as its own CSV file in the output
//! directory. Renderers pick these up and decide how to draw them.

use crate::analysis::{Analysis, win_ratio_frame};
use crate::constants::report_files;
use crate::error::Result;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Report writing statistics
#[derive(Debug, Default)]
pub struct ReportStats {
    pub files_written: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

/// Writes aggregation tables as CSV files
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run every aggregation and write one CSV per result
    pub fn write(&self, analysis: &Analysis) -> Result<ReportStats> {
        fs::create_dir_all(&self.output_dir)?;

        let labels = analysis.labels();
        let tables = [
            (report_files::YEARLY_TOTALS, analysis.yearly_totals()?),
            (report_files::MONTHLY_TOTALS, analysis.monthly_totals()?),
            (
                report_files::YEAR_MONTH_MATRIX,
                analysis.year_month_matrix()?.to_dataframe()?,
            ),
            (
                report_files::WIN_RATIO,
                win_ratio_frame(&analysis.win_ratio_by_year()?)?,
            ),
            (report_files::REJECTED_BY_YEAR, analysis.rejected_by_year()?),
            (
                report_files::WIN_LOSS_TOTALS,
                analysis.win_loss_totals()?.to_dataframe(labels)?,
            ),
        ];

        let mut stats = ReportStats {
            files_written: Vec::with_capacity(tables.len()),
            output_dir: self.output_dir.clone(),
        };

        for (file_name, mut df) in tables {
            let path = self.output_dir.join(file_name);
            write_csv(&path, &mut df)?;
            debug!("Wrote {} rows to {}", df.height(), path.display());
            stats.files_written.push(path);
        }

        info!(
            "Wrote {} report tables to {}",
            stats.files_written.len(),
            self.output_dir.display()
        );
        Ok(stats)
    }
}

fn write_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatusLabels;
    use crate::models::{LongRecord, LongTable, ReshapeStats};
    use tempfile::TempDir;

    fn analysis() -> Analysis {
        let long = LongTable {
            records: vec![
                LongRecord {
                    year: Some("2020".to_string()),
                    month_key: "2020-january".to_string(),
                    status: Some("won".to_string()),
                    count: 5,
                },
                LongRecord {
                    year: Some("2020".to_string()),
                    month_key: "2020-january".to_string(),
                    status: Some("lost".to_string()),
                    count: 5,
                },
            ],
            stats: ReshapeStats::default(),
        };
        Analysis::new(&long, StatusLabels::default()).unwrap()
    }

    #[test]
    fn test_writes_every_report_file() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("nested").join("reports");

        let stats = ReportWriter::new(&output_dir).write(&analysis()).unwrap();

        assert_eq!(stats.files_written.len(), report_files::ALL.len());
        for file_name in report_files::ALL {
            assert!(output_dir.join(file_name).exists(), "{} missing", file_name);
        }
    }

    #[test]
    fn test_win_ratio_file_contents() {
        let temp_dir = TempDir::new().unwrap();
        ReportWriter::new(temp_dir.path()).write(&analysis()).unwrap();

        let contents = fs::read_to_string(temp_dir.path().join(report_files::WIN_RATIO)).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("year,won,lost,ratio"));
        assert_eq!(lines.next(), Some("2020,5,5,0.5"));
    }

    #[test]
    fn test_empty_analysis_still_writes_headers() {
        let temp_dir = TempDir::new().unwrap();
        let empty = Analysis::new(&LongTable::default(), StatusLabels::default()).unwrap();

        ReportWriter::new(temp_dir.path()).write(&empty).unwrap();

        let contents =
            fs::read_to_string(temp_dir.path().join(report_files::YEARLY_TOTALS)).unwrap();
        assert_eq!(contents.lines().next(), Some("year,status,count"));
    }
}
