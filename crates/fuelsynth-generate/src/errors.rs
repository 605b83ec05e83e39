use std::fmt;

use thiserror::Error;

/// Step of an export at which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Generate,
    Validate,
    Write,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportStage::Generate => "generate",
            ExportStage::Validate => "validate",
            ExportStage::Write => "write",
        };
        f.write_str(name)
    }
}

/// Errors emitted by the generator and the batch writer.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("generation error: {0}")]
    Generation(String),
    #[error("schema violation: {0}")]
    SchemaViolation(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error(transparent)]
    Core(#[from] fuelsynth_core::Error),
    #[error("{stage} stage failed for a batch of {rows} rows: {source}")]
    Export {
        stage: ExportStage,
        rows: usize,
        #[source]
        source: Box<GenerationError>,
    },
}

impl GenerationError {
    /// Attach the export stage and batch size to an error.
    pub fn during(self, stage: ExportStage, rows: usize) -> Self {
        GenerationError::Export {
            stage,
            rows,
            source: Box::new(self),
        }
    }

    /// Stage of a wrapped export failure, if any.
    pub fn stage(&self) -> Option<ExportStage> {
        match self {
            GenerationError::Export { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
