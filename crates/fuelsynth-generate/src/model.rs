use std::path::PathBuf;

use serde::Serialize;

use crate::output::WriteSummary;

pub const DEFAULT_ROWS_PER_FILE: usize = 300;

/// Options for the export engine.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOptions {
    /// Directory where batch files are written.
    pub out_dir: PathBuf,
    /// Records per file; must be positive.
    pub rows_per_file: usize,
    /// Seed for reproducible batches. Drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("data"),
            rows_per_file: DEFAULT_ROWS_PER_FILE,
            seed: None,
        }
    }
}

/// Summary of one exported batch.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub run_id: String,
    pub rows_requested: usize,
    pub emergencies: usize,
    pub file: WriteSummary,
    pub duration_ms: u64,
}
