//! Record synthesis and batch export for fuelsynth.
//!
//! Field generators draw bounded values from the reference pools, the
//! assembler composes them into consistent records, and the output module
//! writes each batch as one Snappy-compressed Parquet file.

pub mod assembler;
pub mod clock;
pub mod engine;
pub mod errors;
pub mod generators;
pub mod model;
pub mod output;

pub use assembler::RecordGenerator;
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{ExportEngine, ExportResult};
pub use errors::{ExportStage, GenerationError};
pub use model::{DEFAULT_ROWS_PER_FILE, ExportOptions, ExportReport};
pub use output::{ParquetBatchWriter, WriteSummary, ensure_output_dir, read_batch_file};
