mod atomic;
pub mod parquet;

pub use self::parquet::{
    FILE_EXTENSION, FILE_PREFIX, ParquetBatchWriter, WriteSummary, arrow_schema,
    batch_to_records, ensure_output_dir, file_name_for, read_batch_file, records_to_batch,
};
