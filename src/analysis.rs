//! Grouped aggregations over the long-form table.
//!
//! These are the queries chart renderers run against the reshaped data:
//! totals by year and status, totals by month and status, the year × month
//! matrix, the yearly win ratio, rejections per year and the overall
//! win/loss split. All of them go through polars lazy frames.

use crate::config::{Locale, StatusLabels};
use crate::constants::columns::{COUNT, MONTH_KEY, STATUS, YEAR};
use crate::error::Result;
use crate::models::LongTable;
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Calendar ordinal of each record's month, used for chronological sorts
const MONTH_ORDINAL: &str = "month_ordinal";

/// Summed counts pivoted by year (rows) and month key (columns)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearMonthMatrix {
    pub years: Vec<Option<String>>,
    pub month_keys: Vec<String>,
    /// `cells[year][month_key]`; `None` where no record exists
    pub cells: Vec<Vec<Option<u64>>>,
}

impl YearMonthMatrix {
    pub fn get(&self, year: Option<&str>, month_key: &str) -> Option<u64> {
        let row = self.years.iter().position(|y| y.as_deref() == year)?;
        let column = self.month_keys.iter().position(|k| k == month_key)?;
        self.cells[row][column]
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut frame_columns = Vec::with_capacity(self.month_keys.len() + 1);
        frame_columns.push(Column::new(YEAR.into(), self.years.clone()));
        for (index, month_key) in self.month_keys.iter().enumerate() {
            let values: Vec<Option<u64>> = self.cells.iter().map(|row| row[index]).collect();
            frame_columns.push(Column::new(month_key.as_str().into(), values));
        }
        Ok(DataFrame::new(frame_columns)?)
    }
}

/// Won share of decided bids in one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinRatio {
    pub year: Option<String>,
    pub won: u64,
    pub lost: u64,
    /// `won / (won + lost)`, absent when both are zero
    pub ratio: Option<f64>,
}

/// Overall won and lost counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WinLossTotals {
    pub won: u64,
    pub lost: u64,
}

impl WinLossTotals {
    /// Render as a two-row `status, count` frame
    pub fn to_dataframe(&self, labels: &StatusLabels) -> Result<DataFrame> {
        let df = df!(
            STATUS => [labels.won.as_str(), labels.lost.as_str()],
            COUNT => [self.won, self.lost]
        )?;
        Ok(df)
    }
}

/// Render win ratios as a `year, won, lost, ratio` frame
pub fn win_ratio_frame(ratios: &[WinRatio]) -> Result<DataFrame> {
    let years: Vec<Option<&str>> = ratios.iter().map(|r| r.year.as_deref()).collect();
    let won: Vec<u64> = ratios.iter().map(|r| r.won).collect();
    let lost: Vec<u64> = ratios.iter().map(|r| r.lost).collect();
    let ratio: Vec<Option<f64>> = ratios.iter().map(|r| r.ratio).collect();

    let df = df!(
        YEAR => years,
        "won" => won,
        "lost" => lost,
        "ratio" => ratio
    )?;
    Ok(df)
}

/// Calendar ordinal (1-12) of the month named at the end of a month key
fn month_ordinal(month_key: &str) -> Option<u32> {
    let (_, name) = month_key.rsplit_once('-')?;
    Locale::month_from_name(name).map(|month| month.number_from_month())
}

/// Aggregation queries over one long-form table
#[derive(Debug, Clone)]
pub struct Analysis {
    frame: DataFrame,
    labels: StatusLabels,
}

impl Analysis {
    pub fn new(long: &LongTable, labels: StatusLabels) -> Result<Self> {
        let mut frame = long.to_dataframe()?;
        let ordinals: Vec<Option<u32>> =
            long.iter().map(|r| month_ordinal(&r.month_key)).collect();
        frame.with_column(Column::new(MONTH_ORDINAL.into(), ordinals))?;

        debug!("Analysis frame built with {} rows", frame.height());
        Ok(Self { frame, labels })
    }

    /// The long-form frame: `year, month_key, status, count, month_ordinal`
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn labels(&self) -> &StatusLabels {
        &self.labels
    }

    /// Sum of count by (year, status), sorted by year then status
    pub fn yearly_totals(&self) -> Result<DataFrame> {
        let df = self
            .frame
            .clone()
            .lazy()
            .group_by([col(YEAR), col(STATUS)])
            .agg([col(COUNT).sum()])
            .sort_by_exprs([col(YEAR), col(STATUS)], SortMultipleOptions::default())
            .collect()?;
        Ok(df)
    }

    /// Sum of count by (month_key, status), sorted by year, calendar month
    /// and status
    pub fn monthly_totals(&self) -> Result<DataFrame> {
        let df = self
            .frame
            .clone()
            .lazy()
            .group_by([col(YEAR), col(MONTH_ORDINAL), col(MONTH_KEY), col(STATUS)])
            .agg([col(COUNT).sum()])
            .sort_by_exprs(
                [col(YEAR), col(MONTH_ORDINAL), col(MONTH_KEY), col(STATUS)],
                SortMultipleOptions::default(),
            )
            .select([col(MONTH_KEY), col(STATUS), col(COUNT)])
            .collect()?;
        Ok(df)
    }

    /// Pivot of summed count by year × month_key, years ascending and month
    /// keys in calendar order
    pub fn year_month_matrix(&self) -> Result<YearMonthMatrix> {
        let grouped = self
            .frame
            .clone()
            .lazy()
            .group_by([col(YEAR), col(MONTH_ORDINAL), col(MONTH_KEY)])
            .agg([col(COUNT).sum()])
            .sort_by_exprs(
                [col(YEAR), col(MONTH_ORDINAL), col(MONTH_KEY)],
                SortMultipleOptions::default(),
            )
            .collect()?;

        let years = grouped.column(YEAR)?.str()?;
        let month_keys = grouped.column(MONTH_KEY)?.str()?;
        let counts = grouped.column(COUNT)?.u64()?;

        let mut year_index: HashMap<Option<String>, usize> = HashMap::new();
        let mut month_index: HashMap<String, usize> = HashMap::new();
        let mut matrix = YearMonthMatrix {
            years: Vec::new(),
            month_keys: Vec::new(),
            cells: Vec::new(),
        };

        for row in 0..grouped.height() {
            let year = years.get(row).map(str::to_string);
            let month_key = month_keys.get(row).unwrap_or_default().to_string();

            let y = *year_index.entry(year.clone()).or_insert_with(|| {
                matrix.years.push(year);
                matrix.cells.push(vec![None; matrix.month_keys.len()]);
                matrix.years.len() - 1
            });
            let m = *month_index.entry(month_key.clone()).or_insert_with(|| {
                matrix.month_keys.push(month_key);
                for cells in matrix.cells.iter_mut() {
                    cells.push(None);
                }
                matrix.month_keys.len() - 1
            });

            matrix.cells[y][m] = counts.get(row);
        }

        Ok(matrix)
    }

    /// Won / (won + lost) per year; a missing side counts as zero
    pub fn win_ratio_by_year(&self) -> Result<Vec<WinRatio>> {
        let won = lit(self.labels.won.clone());
        let lost = lit(self.labels.lost.clone());

        let df = self
            .frame
            .clone()
            .lazy()
            .filter(col(STATUS).eq(won.clone()).or(col(STATUS).eq(lost.clone())))
            .group_by([col(YEAR)])
            .agg([
                col(COUNT).filter(col(STATUS).eq(won)).sum().alias("won"),
                col(COUNT).filter(col(STATUS).eq(lost)).sum().alias("lost"),
            ])
            .sort_by_exprs([col(YEAR)], SortMultipleOptions::default())
            .collect()?;

        let years = df.column(YEAR)?.str()?;
        let won = df.column("won")?.u64()?;
        let lost = df.column("lost")?.u64()?;

        let ratios = (0..df.height())
            .map(|row| {
                let won = won.get(row).unwrap_or(0);
                let lost = lost.get(row).unwrap_or(0);
                let decided = won + lost;
                WinRatio {
                    year: years.get(row).map(str::to_string),
                    won,
                    lost,
                    ratio: (decided > 0).then(|| won as f64 / decided as f64),
                }
            })
            .collect();

        Ok(ratios)
    }

    /// Sum of rejected counts per year, sorted by year
    pub fn rejected_by_year(&self) -> Result<DataFrame> {
        let df = self
            .frame
            .clone()
            .lazy()
            .filter(col(STATUS).eq(lit(self.labels.rejected.clone())))
            .group_by([col(YEAR)])
            .agg([col(COUNT).sum()])
            .sort_by_exprs([col(YEAR)], SortMultipleOptions::default())
            .collect()?;
        Ok(df)
    }

    /// Overall won and lost sums
    pub fn win_loss_totals(&self) -> Result<WinLossTotals> {
        Ok(WinLossTotals {
            won: self.status_total(&self.labels.won)?,
            lost: self.status_total(&self.labels.lost)?,
        })
    }

    fn status_total(&self, status: &str) -> Result<u64> {
        let df = self
            .frame
            .clone()
            .lazy()
            .filter(col(STATUS).eq(lit(status.to_string())))
            .select([col(COUNT).sum()])
            .collect()?;
        Ok(df.column(COUNT)?.u64()?.get(0).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LongRecord, ReshapeStats};

    fn record(year: &str, month: &str, status: &str, count: u64) -> LongRecord {
        LongRecord {
            year: Some(year.to_string()),
            month_key: format!("{}-{}", year, month),
            status: Some(status.to_string()),
            count,
        }
    }

    fn sample() -> Analysis {
        let long = LongTable {
            records: vec![
                record("2020", "january", "won", 5),
                record("2020", "january", "lost", 3),
                record("2020", "february", "won", 2),
                record("2020", "february", "rejected-stage-1", 1),
                record("2021", "january", "won", 4),
                record("2021", "march", "rejected-stage-1", 6),
                record("2021", "march", "rejected-stage-1", 2),
            ],
            stats: ReshapeStats::default(),
        };
        Analysis::new(&long, StatusLabels::default()).unwrap()
    }

    fn total_for(df: &DataFrame, key_column: &str, key: &str, status: &str) -> Option<u64> {
        let keys = df.column(key_column).unwrap().str().unwrap();
        let statuses = df.column(STATUS).unwrap().str().unwrap();
        let counts = df.column(COUNT).unwrap().u64().unwrap();
        (0..df.height())
            .find(|&i| keys.get(i) == Some(key) && statuses.get(i) == Some(status))
            .and_then(|i| counts.get(i))
    }

    #[test]
    fn test_yearly_totals() {
        let df = sample().yearly_totals().unwrap();
        assert_eq!(df.height(), 5);
        assert_eq!(total_for(&df, YEAR, "2020", "won"), Some(7));
        assert_eq!(total_for(&df, YEAR, "2020", "lost"), Some(3));
        assert_eq!(total_for(&df, YEAR, "2021", "rejected-stage-1"), Some(8));

        let years = df.column(YEAR).unwrap().str().unwrap();
        assert_eq!(years.get(0), Some("2020"));
        assert_eq!(years.get(df.height() - 1), Some("2021"));
    }

    #[test]
    fn test_monthly_totals_keep_chronological_order() {
        let df = sample().monthly_totals().unwrap();
        let keys = df.column(MONTH_KEY).unwrap().str().unwrap();
        assert_eq!(keys.get(0), Some("2020-january"));
        assert_eq!(total_for(&df, MONTH_KEY, "2021-march", "rejected-stage-1"), Some(8));
    }

    #[test]
    fn test_out_of_order_rows_aggregate_chronologically() {
        let long = LongTable {
            records: vec![
                record("2021", "january", "won", 1),
                record("2020", "march", "won", 2),
                record("2020", "january", "won", 3),
            ],
            stats: ReshapeStats::default(),
        };
        let analysis = Analysis::new(&long, StatusLabels::default()).unwrap();

        let df = analysis.monthly_totals().unwrap();
        let keys: Vec<Option<&str>> =
            df.column(MONTH_KEY).unwrap().str().unwrap().into_iter().collect();
        assert_eq!(keys, vec![
            Some("2020-january"),
            Some("2020-march"),
            Some("2021-january"),
        ]);
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec![MONTH_KEY, STATUS, COUNT]);

        let matrix = analysis.year_month_matrix().unwrap();
        assert_eq!(matrix.years, vec![Some("2020".to_string()), Some("2021".to_string())]);
        assert_eq!(matrix.month_keys, vec!["2020-january", "2020-march", "2021-january"]);
    }

    #[test]
    fn test_month_ordinal_from_key() {
        assert_eq!(month_ordinal("2020-march"), Some(3));
        assert_eq!(month_ordinal("2017-декабрь"), Some(12));
        assert_eq!(month_ordinal("-january"), Some(1));
        assert_eq!(month_ordinal("2020"), None);
    }

    #[test]
    fn test_year_month_matrix() {
        let matrix = sample().year_month_matrix().unwrap();
        assert_eq!(matrix.years, vec![Some("2020".to_string()), Some("2021".to_string())]);
        assert_eq!(matrix.month_keys, vec![
            "2020-january",
            "2020-february",
            "2021-january",
            "2021-march",
        ]);
        assert_eq!(matrix.get(Some("2020"), "2020-january"), Some(8));
        assert_eq!(matrix.get(Some("2021"), "2021-march"), Some(8));
        assert_eq!(matrix.get(Some("2021"), "2020-january"), None);

        let df = matrix.to_dataframe().unwrap();
        assert_eq!(df.shape(), (2, 5));
    }

    #[test]
    fn test_win_ratio_by_year() {
        let ratios = sample().win_ratio_by_year().unwrap();
        assert_eq!(ratios.len(), 2);

        assert_eq!(ratios[0].year.as_deref(), Some("2020"));
        assert_eq!((ratios[0].won, ratios[0].lost), (7, 3));
        assert!((ratios[0].ratio.unwrap() - 0.7).abs() < 1e-9);

        // 2021 has wins and no losses
        assert_eq!((ratios[1].won, ratios[1].lost), (4, 0));
        assert_eq!(ratios[1].ratio, Some(1.0));
    }

    #[test]
    fn test_rejected_by_year() {
        let df = sample().rejected_by_year().unwrap();
        let counts = df.column(COUNT).unwrap().u64().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(counts.get(0), Some(1));
        assert_eq!(counts.get(1), Some(8));
    }

    #[test]
    fn test_win_loss_totals() {
        let totals = sample().win_loss_totals().unwrap();
        assert_eq!(totals, WinLossTotals { won: 11, lost: 3 });

        let df = totals.to_dataframe(&StatusLabels::default()).unwrap();
        assert_eq!(df.shape(), (2, 2));
    }

    #[test]
    fn test_empty_table_aggregates_to_nothing() {
        let analysis = Analysis::new(&LongTable::default(), StatusLabels::default()).unwrap();
        assert_eq!(analysis.yearly_totals().unwrap().height(), 0);
        assert!(analysis.win_ratio_by_year().unwrap().is_empty());
        assert_eq!(analysis.win_loss_totals().unwrap(), WinLossTotals { won: 0, lost: 0 });
        assert!(analysis.year_month_matrix().unwrap().years.is_empty());
    }

    #[test]
    fn test_win_ratio_frame_columns() {
        let df = win_ratio_frame(&[WinRatio {
            year: Some("2020".to_string()),
            won: 0,
            lost: 0,
            ratio: None,
        }])
        .unwrap();
        assert_eq!(df.shape(), (1, 4));
        assert_eq!(df.column("ratio").unwrap().null_count(), 1);
    }
}
