use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use parquet::basic::Compression;
use parquet::file::reader::{FileReader, SerializedFileReader};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;

use fuelsynth_core::{FUEL_SCHEMA, Record, ReferencePools};
use fuelsynth_generate::{
    FixedClock, GenerationError, ParquetBatchWriter, RecordGenerator, read_batch_file,
};

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("fuelsynth_generate_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}

fn batch(n: usize, seed: u64) -> Vec<Record> {
    let now = Utc
        .with_ymd_and_hms(2025, 6, 30, 12, 34, 56)
        .single()
        .expect("valid timestamp")
        + chrono::Duration::nanoseconds(123_456_789);
    let generator =
        RecordGenerator::with_clock(ReferencePools::default(), Box::new(FixedClock(now)))
            .expect("valid pools");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generator.generate_batch(&mut rng, n).expect("batch")
}

#[test]
fn written_batch_reads_back_unchanged() {
    let out_dir = temp_out_dir("roundtrip");
    let records = batch(300, 99);

    let summary = ParquetBatchWriter::new(&out_dir)
        .write_batch(&records)
        .expect("write batch");

    assert_eq!(summary.rows, 300);
    assert_eq!(summary.columns, FUEL_SCHEMA.len());
    assert!(summary.bytes > 0);
    assert_eq!(fs::metadata(&summary.path).expect("file").len(), summary.bytes);

    let restored = read_batch_file(&summary.path).expect("read batch");
    assert_eq!(restored, records);
}

#[test]
fn single_row_batch_keeps_nested_list_and_decimal_encoding() {
    let out_dir = temp_out_dir("single");
    let records = batch(1, 5);

    let summary = ParquetBatchWriter::new(&out_dir)
        .write_batch(&records)
        .expect("write batch");
    assert_eq!(summary.rows, 1);

    let restored = read_batch_file(&summary.path).expect("read batch");
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].dock, records[0].dock);
    assert_eq!(restored[0].services, records[0].services);
    assert_eq!(restored[0].price_per_unit, records[0].price_per_unit);
    assert_eq!(restored[0].total_cost, records[0].total_cost);
    assert_eq!(restored[0].visited_at, records[0].visited_at);
}

#[test]
fn file_declares_snappy_and_row_count() {
    let out_dir = temp_out_dir("metadata");
    let records = batch(25, 8);
    let summary = ParquetBatchWriter::new(&out_dir)
        .write_batch(&records)
        .expect("write batch");

    let reader =
        SerializedFileReader::new(fs::File::open(&summary.path).expect("open")).expect("reader");
    let metadata = reader.metadata();
    assert_eq!(metadata.file_metadata().num_rows(), 25);
    let row_group = metadata.row_group(0);
    for idx in 0..row_group.num_columns() {
        assert_eq!(row_group.column(idx).compression(), Compression::SNAPPY);
    }
}

#[test]
fn file_name_is_derived_from_write_time() {
    let out_dir = temp_out_dir("naming");
    let now = Utc
        .with_ymd_and_hms(2031, 12, 24, 18, 0, 5)
        .single()
        .expect("valid timestamp");
    let summary = ParquetBatchWriter::new(&out_dir)
        .write_batch_at(&batch(3, 1), now)
        .expect("write batch");

    assert_eq!(
        summary.path.file_name().and_then(|name| name.to_str()),
        Some("fuel_export_20311224_180005.parquet")
    );
    let leftovers: Vec<_> = fs::read_dir(&out_dir)
        .expect("list dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn empty_batch_writes_schema_only_file() {
    let out_dir = temp_out_dir("empty");
    let summary = ParquetBatchWriter::new(&out_dir)
        .write_batch(&[])
        .expect("write empty batch");

    assert_eq!(summary.rows, 0);
    assert_eq!(summary.columns, FUEL_SCHEMA.len());
    assert!(read_batch_file(&summary.path).expect("read").is_empty());
}

#[test]
fn schema_violation_aborts_without_output() {
    let out_dir = temp_out_dir("violation");
    let mut records = batch(10, 2);
    records[7].price_per_unit = Decimal::new(123_456_789, 2);

    let result = ParquetBatchWriter::new(&out_dir).write_batch(&records);
    assert!(matches!(result, Err(GenerationError::SchemaViolation(_))));
    assert_eq!(fs::read_dir(&out_dir).expect("list dir").count(), 0);
}

#[test]
fn unrounded_decimal_is_a_violation() {
    let out_dir = temp_out_dir("scale");
    let mut records = batch(2, 2);
    records[0].total_cost = Decimal::new(1_234_567, 3);

    let result = ParquetBatchWriter::new(&out_dir).write_batch(&records);
    assert!(matches!(result, Err(GenerationError::SchemaViolation(_))));
}

#[test]
fn fuel_units_beyond_float32_cents_are_a_violation() {
    let out_dir = temp_out_dir("float32");
    let mut records = batch(3, 6);
    records[1].fuel_units = Decimal::new(20_000_001, 2);

    let result = ParquetBatchWriter::new(&out_dir).write_batch(&records);
    assert!(matches!(result, Err(GenerationError::SchemaViolation(_))));
    assert_eq!(fs::read_dir(&out_dir).expect("list dir").count(), 0);
}

#[test]
fn whole_fuel_units_keep_two_fractional_digits() {
    let out_dir = temp_out_dir("units_scale");
    let mut records = batch(2, 6);
    records[0].fuel_units = Decimal::new(50, 0);
    records[1].fuel_units = Decimal::new(499_999, 2);

    let summary = ParquetBatchWriter::new(&out_dir)
        .write_batch(&records)
        .expect("write batch");
    let restored = read_batch_file(&summary.path).expect("read batch");

    assert_eq!(restored[0].fuel_units.to_string(), "50.00");
    assert_eq!(restored[1].fuel_units.to_string(), "4999.99");
}

#[test]
fn missing_directory_is_an_io_error() {
    let mut out_dir = temp_out_dir("missing");
    out_dir.push("not-created");

    let result = ParquetBatchWriter::new(&out_dir).write_batch(&batch(1, 1));
    assert!(matches!(result, Err(GenerationError::Io(_))));
}
