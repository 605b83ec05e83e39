use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Date32Array, Decimal128Array, Float32Array,
    Float64Array, Int16Array, Int32Array, ListBuilder, PrimitiveArray, StringArray, StringBuilder,
    StructArray, TimestampNanosecondArray,
};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Date32Type, Decimal128Type, Field, Fields, Float32Type,
    Float64Type, Int16Type, Int32Type, Schema, SchemaRef, TimeUnit, TimestampNanosecondType,
};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::info;

use fuelsynth_core::{
    ColumnKind, ColumnSpec, Dock, FUEL_SCHEMA, MONEY_SCALE, Record, decimal_fits, round_money,
};

use crate::errors::GenerationError;
use crate::output::atomic::write_atomic;

pub const FILE_PREFIX: &str = "fuel_export_";
pub const FILE_EXTENSION: &str = "parquet";
const UTC_TZ: &str = "UTC";
/// Days from 0001-01-01 to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Structural metadata of a written batch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub bytes: u64,
}

/// Writes one Parquet file per batch into a fixed directory.
#[derive(Debug, Clone)]
pub struct ParquetBatchWriter {
    out_dir: PathBuf,
    compression: Compression,
}

impl ParquetBatchWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            compression: Compression::SNAPPY,
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn write_batch(&self, records: &[Record]) -> Result<WriteSummary, GenerationError> {
        self.write_batch_at(records, Utc::now())
    }

    /// Serialize `records` into `fuel_export_<YYYYMMDD_HHMMSS>.parquet`.
    ///
    /// The whole batch is converted before the file is created, so a schema
    /// violation in any record leaves nothing on disk. A file written in the
    /// same second as an earlier one replaces it.
    pub fn write_batch_at(
        &self,
        records: &[Record],
        now: DateTime<Utc>,
    ) -> Result<WriteSummary, GenerationError> {
        if !self.out_dir.is_dir() {
            return Err(GenerationError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("output directory {} does not exist", self.out_dir.display()),
            )));
        }

        let batch = records_to_batch(records)?;
        let path = self.out_dir.join(file_name_for(now));
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .build();

        write_atomic(&path, |tmp_path| {
            let file = File::create(tmp_path)?;
            let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
            writer.write(&batch)?;
            writer.close()?;
            Ok(())
        })?;

        let summary = WriteSummary {
            bytes: std::fs::metadata(&path)?.len(),
            rows: batch.num_rows(),
            columns: batch.num_columns(),
            path,
        };
        info!(
            path = %summary.path.display(),
            rows = summary.rows,
            cols = summary.columns,
            size = summary.bytes,
            "wrote batch file"
        );
        Ok(summary)
    }
}

/// Create the output directory if it is missing.
pub fn ensure_output_dir(path: &Path) -> Result<(), GenerationError> {
    std::fs::create_dir_all(path)?;
    info!(path = %path.display(), "ensured output directory exists");
    Ok(())
}

pub fn file_name_for(now: DateTime<Utc>) -> String {
    format!(
        "{FILE_PREFIX}{}.{FILE_EXTENSION}",
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Arrow rendition of the fixed column schema.
pub fn arrow_schema() -> SchemaRef {
    Arc::new(Schema::new(to_fields(FUEL_SCHEMA)))
}

fn to_fields(columns: &[ColumnSpec]) -> Fields {
    columns
        .iter()
        .map(|column| Field::new(column.name, data_type(&column.kind), column.nullable))
        .collect()
}

fn data_type(kind: &ColumnKind) -> DataType {
    match kind {
        ColumnKind::Utf8 => DataType::Utf8,
        ColumnKind::Int16 => DataType::Int16,
        ColumnKind::Int32 => DataType::Int32,
        ColumnKind::Float32 => DataType::Float32,
        ColumnKind::Float64 => DataType::Float64,
        ColumnKind::Bool => DataType::Boolean,
        ColumnKind::Decimal { precision, scale } => DataType::Decimal128(*precision, *scale as i8),
        ColumnKind::TimestampUtc => DataType::Timestamp(TimeUnit::Nanosecond, Some(UTC_TZ.into())),
        ColumnKind::Date => DataType::Date32,
        ColumnKind::Struct { fields } => DataType::Struct(to_fields(fields)),
        ColumnKind::Utf8List => DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
    }
}

/// Convert records into one Arrow batch, column by column in schema order.
pub fn records_to_batch(records: &[Record]) -> Result<RecordBatch, GenerationError> {
    let columns = FUEL_SCHEMA
        .iter()
        .map(|column| column_array(column, records))
        .collect::<Result<Vec<_>, _>>()?;
    RecordBatch::try_new(arrow_schema(), columns)
        .map_err(|err| GenerationError::SchemaViolation(err.to_string()))
}

fn column_array(column: &ColumnSpec, records: &[Record]) -> Result<ArrayRef, GenerationError> {
    let array: ArrayRef = match column.name {
        "transaction_id" => strings(records, |r| &r.transaction_id),
        "station_id" => Arc::new(Int32Array::from_iter_values(
            records.iter().map(|r| r.station_id),
        )),
        "dock" => dock_array(column, records)?,
        "ship_name" => strings(records, |r| &r.ship_name),
        "franchise" => strings(records, |r| &r.franchise),
        "captain_name" => strings(records, |r| &r.captain_name),
        "species" => strings(records, |r| &r.species),
        "fuel_type" => strings(records, |r| &r.fuel_type),
        "fuel_units" => {
            let values = records
                .iter()
                .map(|r| {
                    if round_money(r.fuel_units) != r.fuel_units {
                        return Err(violation(r, "fuel_units has more than 2 fractional digits"));
                    }
                    let value = r
                        .fuel_units
                        .to_f32()
                        .ok_or_else(|| violation(r, "fuel_units does not fit float32"))?;
                    if units_from_f32(value) != Some(r.fuel_units) {
                        return Err(violation(r, "fuel_units loses precision as float32"));
                    }
                    Ok(value)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Arc::new(Float32Array::from(values))
        }
        "price_per_unit" => decimal_array(column, records, |r| r.price_per_unit)?,
        "total_cost" => decimal_array(column, records, |r| r.total_cost)?,
        "services" => {
            let mut builder = ListBuilder::new(StringBuilder::new());
            for record in records {
                for service in &record.services {
                    builder.values().append_value(service);
                }
                builder.append(true);
            }
            Arc::new(builder.finish())
        }
        "is_emergency" => Arc::new(BooleanArray::from(
            records.iter().map(|r| r.is_emergency).collect::<Vec<_>>(),
        )),
        "visited_at" => {
            let values = records
                .iter()
                .map(|r| {
                    r.visited_at
                        .timestamp_nanos_opt()
                        .ok_or_else(|| violation(r, "visited_at is outside the nanosecond range"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Arc::new(TimestampNanosecondArray::from(values).with_timezone(UTC_TZ))
        }
        "arrival_date" => Arc::new(Date32Array::from_iter_values(
            records
                .iter()
                .map(|r| r.arrival_date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
        )),
        "coords_x" => Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.coords_x),
        )),
        "coords_y" => Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.coords_y),
        )),
        other => {
            return Err(GenerationError::SchemaViolation(format!(
                "no record field for column '{other}'"
            )));
        }
    };
    Ok(array)
}

fn strings<F>(records: &[Record], field: F) -> ArrayRef
where
    F: Fn(&Record) -> &String,
{
    Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| field(r).as_str()),
    ))
}

fn dock_array(column: &ColumnSpec, records: &[Record]) -> Result<ArrayRef, GenerationError> {
    let ColumnKind::Struct { fields } = column.kind else {
        return Err(GenerationError::SchemaViolation(format!(
            "column '{}' is not a struct",
            column.name
        )));
    };
    let bays: ArrayRef = Arc::new(Int16Array::from_iter_values(
        records.iter().map(|r| r.dock.bay),
    ));
    let levels: ArrayRef = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.dock.level.as_str()),
    ));
    let dock = StructArray::try_new(to_fields(fields), vec![bays, levels], None)
        .map_err(|err| GenerationError::SchemaViolation(format!("dock: {err}")))?;
    Ok(Arc::new(dock))
}

fn decimal_array<F>(
    column: &ColumnSpec,
    records: &[Record],
    field: F,
) -> Result<ArrayRef, GenerationError>
where
    F: Fn(&Record) -> Decimal,
{
    let ColumnKind::Decimal { precision, scale } = column.kind else {
        return Err(GenerationError::SchemaViolation(format!(
            "column '{}' is not a decimal",
            column.name
        )));
    };
    let scale_u32 = u32::from(scale);
    let values = records
        .iter()
        .map(|record| {
            let value = field(record);
            if !decimal_fits(value, precision, scale_u32) {
                return Err(violation(
                    record,
                    &format!(
                        "{} = {value} does not fit DECIMAL({precision},{scale})",
                        column.name
                    ),
                ));
            }
            let mut rescaled = value;
            rescaled.rescale(scale_u32);
            Ok(rescaled.mantissa())
        })
        .collect::<Result<Vec<_>, _>>()?;
    let array = Decimal128Array::from(values).with_precision_and_scale(precision, scale as i8)?;
    Ok(Arc::new(array))
}

/// Amount in cents carried by a float32 `fuel_units` cell.
fn units_from_f32(value: f32) -> Option<Decimal> {
    Decimal::from_f32_retain(value).map(|units| {
        let mut cents = round_money(units);
        cents.rescale(MONEY_SCALE);
        cents
    })
}

fn violation(record: &Record, message: &str) -> GenerationError {
    GenerationError::SchemaViolation(format!("{}: {message}", record.transaction_id))
}

/// Read a batch file back into records.
pub fn read_batch_file(path: &Path) -> Result<Vec<Record>, GenerationError> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let mut records = Vec::new();
    for batch in reader {
        records.extend(batch_to_records(&batch?)?);
    }
    Ok(records)
}

/// Decode an Arrow batch that follows the fixed schema.
pub fn batch_to_records(batch: &RecordBatch) -> Result<Vec<Record>, GenerationError> {
    let expected: Vec<&str> = FUEL_SCHEMA.iter().map(|column| column.name).collect();
    let schema = batch.schema();
    let found: Vec<&str> = schema
        .fields()
        .iter()
        .map(|field| field.name().as_str())
        .collect();
    if found != expected {
        return Err(GenerationError::SchemaViolation(format!(
            "expected columns {expected:?}, found {found:?}"
        )));
    }
    for (name, array) in expected.iter().zip(batch.columns()) {
        if array.null_count() > 0 {
            return Err(GenerationError::SchemaViolation(format!(
                "column '{name}' contains nulls"
            )));
        }
    }

    let ids = string_column(batch, "transaction_id")?;
    let stations = primitive_column::<Int32Type>(batch, "station_id")?;
    let dock = column(batch, "dock")?
        .as_struct_opt()
        .ok_or_else(|| mismatch("dock"))?;
    let bays = dock
        .column_by_name("bay")
        .and_then(|array| array.as_primitive_opt::<Int16Type>())
        .ok_or_else(|| mismatch("dock.bay"))?;
    let levels = dock
        .column_by_name("level")
        .and_then(|array| array.as_string_opt::<i32>())
        .ok_or_else(|| mismatch("dock.level"))?;
    let ships = string_column(batch, "ship_name")?;
    let franchises = string_column(batch, "franchise")?;
    let captains = string_column(batch, "captain_name")?;
    let species = string_column(batch, "species")?;
    let fuel_types = string_column(batch, "fuel_type")?;
    let units = primitive_column::<Float32Type>(batch, "fuel_units")?;
    let prices = primitive_column::<Decimal128Type>(batch, "price_per_unit")?;
    let totals = primitive_column::<Decimal128Type>(batch, "total_cost")?;
    let services = column(batch, "services")?
        .as_list_opt::<i32>()
        .ok_or_else(|| mismatch("services"))?;
    let emergencies = column(batch, "is_emergency")?
        .as_boolean_opt()
        .ok_or_else(|| mismatch("is_emergency"))?;
    let visits = primitive_column::<TimestampNanosecondType>(batch, "visited_at")?;
    let arrivals = primitive_column::<Date32Type>(batch, "arrival_date")?;
    let xs = primitive_column::<Float64Type>(batch, "coords_x")?;
    let ys = primitive_column::<Float64Type>(batch, "coords_y")?;

    let mut records = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let transaction_id = ids.value(row).to_string();
        let row_error = |message: &str| {
            GenerationError::SchemaViolation(format!("{transaction_id}: {message}"))
        };

        let fuel_units = units_from_f32(units.value(row))
            .ok_or_else(|| row_error("fuel_units is not a finite number"))?;
        let price_per_unit =
            Decimal::try_from_i128_with_scale(prices.value(row), decimal_scale(prices.scale())?)
                .map_err(|err| row_error(&format!("price_per_unit: {err}")))?;
        let total_cost =
            Decimal::try_from_i128_with_scale(totals.value(row), decimal_scale(totals.scale())?)
                .map_err(|err| row_error(&format!("total_cost: {err}")))?;

        let listed = services.value(row);
        let listed = listed
            .as_string_opt::<i32>()
            .ok_or_else(|| mismatch("services item"))?;
        let services = listed
            .iter()
            .map(|item| {
                item.map(str::to_string)
                    .ok_or_else(|| row_error("services contains a null entry"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let arrival_date =
            NaiveDate::from_num_days_from_ce_opt(arrivals.value(row) + UNIX_EPOCH_DAYS_FROM_CE)
                .ok_or_else(|| row_error("arrival_date out of range"))?;

        records.push(Record {
            station_id: stations.value(row),
            dock: Dock {
                bay: bays.value(row),
                level: levels.value(row).to_string(),
            },
            ship_name: ships.value(row).to_string(),
            franchise: franchises.value(row).to_string(),
            captain_name: captains.value(row).to_string(),
            species: species.value(row).to_string(),
            fuel_type: fuel_types.value(row).to_string(),
            fuel_units,
            price_per_unit,
            total_cost,
            services,
            is_emergency: emergencies.value(row),
            visited_at: DateTime::<Utc>::from_timestamp_nanos(visits.value(row)),
            arrival_date,
            coords_x: xs.value(row),
            coords_y: ys.value(row),
            transaction_id,
        });
    }
    Ok(records)
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, GenerationError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| GenerationError::SchemaViolation(format!("missing column '{name}'")))
}

fn string_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a StringArray, GenerationError> {
    column(batch, name)?
        .as_string_opt::<i32>()
        .ok_or_else(|| mismatch(name))
}

fn primitive_column<'a, T: ArrowPrimitiveType>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a PrimitiveArray<T>, GenerationError> {
    column(batch, name)?
        .as_primitive_opt::<T>()
        .ok_or_else(|| mismatch(name))
}

fn decimal_scale(scale: i8) -> Result<u32, GenerationError> {
    u32::try_from(scale)
        .map_err(|_| GenerationError::SchemaViolation(format!("negative decimal scale {scale}")))
}

fn mismatch(column: &str) -> GenerationError {
    GenerationError::SchemaViolation(format!("column '{column}' has an unexpected type"))
}
