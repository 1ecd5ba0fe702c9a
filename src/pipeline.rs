//! Load → reshape pipeline.
//!
//! Runs the loader and the reshaper back to back. File-level failures abort
//! before anything is reshaped; cell-level failures never escape.

use crate::config::{PipelineConfig, StatusLabels};
use crate::error::Result;
use crate::loader::load_wide_table;
use crate::models::{LongTable, WideTable};
use crate::reshaper::reshape;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Output of a pipeline run
#[derive(Debug)]
pub struct PipelineOutput {
    pub input_path: PathBuf,
    pub wide: WideTable,
    pub long: LongTable,
    /// Status labels matching the export's locale
    pub status_labels: StatusLabels,
    pub processing_time_ms: u128,
}

/// Load and reshape a single auction export
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, input_path: &Path) -> Result<PipelineOutput> {
        let start_time = Instant::now();
        info!("Reshaping {}", input_path.display());

        let wide = load_wide_table(input_path, &self.config)?;
        let long = reshape(&wide);
        let status_labels = self.config.status_labels_for(wide.locale);

        Ok(PipelineOutput {
            input_path: input_path.to_path_buf(),
            wide,
            long,
            status_labels,
            processing_time_ms: start_time.elapsed().as_millis(),
        })
    }
}
