//! Error handling for auction reshaping operations.
//!
//! File-level failures (missing input, empty input, wrong table shape) are
//! fatal and surface here. Cell-level parse failures never do: the reshaper
//! absorbs them as not-applicable cells.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReshapeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Input file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Input file is empty or contains no data rows: {path}")]
    EmptyData { path: PathBuf },

    #[error("Invalid CSV input in file: {path} - {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("Schema mismatch: expected {expected} columns, found {found}")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("Declared header in {path} disagrees with the fixed column order: {details}")]
    HeaderMismatch { path: PathBuf, details: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, ReshapeError>;
