//! Auction Reshaper Library
//!
//! Turns wide auction-bid CSV exports (one row per bid status, one column per
//! calendar month, one column for year) into a long-form table of
//! (year, month_key, status, count) records, and runs the grouped
//! aggregations chart renderers consume.
//!
//! This library provides tools for:
//! - Loading exports with blank-row and duplicate-header repair
//! - Resolving declared headers by name, falling back to position
//! - Reshaping month cells into typed long-form records
//! - Aggregating counts by year, month and status with polars
//! - Exporting the aggregation tables as CSV

pub mod analysis;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod reshaper;

pub use analysis::Analysis;
pub use config::{HeaderCheck, Locale, PipelineConfig, StatusLabels};
pub use error::{ReshapeError, Result};
pub use loader::load_wide_table;
pub use models::{LongRecord, LongTable, MonthCell, WideRecord, WideTable};
pub use pipeline::{Pipeline, PipelineOutput};
pub use reshaper::reshape;
