use std::time::Instant;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use fuelsynth_core::{Record, ReferencePools, validate_record};

use crate::assembler::RecordGenerator;
use crate::clock::{Clock, SystemClock};
use crate::errors::{ExportStage, GenerationError};
use crate::model::{ExportOptions, ExportReport};
use crate::output::{ParquetBatchWriter, WriteSummary, ensure_output_dir};

/// Records of an exported batch together with its report.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub records: Vec<Record>,
    pub report: ExportReport,
}

/// Entry point for generating a batch and writing it to one file.
#[derive(Debug)]
pub struct ExportEngine {
    options: ExportOptions,
    generator: RecordGenerator,
    writer: ParquetBatchWriter,
}

impl ExportEngine {
    pub fn new(options: ExportOptions, pools: ReferencePools) -> Result<Self, GenerationError> {
        Self::with_clock(options, pools, Box::new(SystemClock))
    }

    /// Build an engine, rejecting unusable options and pools up front.
    pub fn with_clock(
        options: ExportOptions,
        pools: ReferencePools,
        clock: Box<dyn Clock>,
    ) -> Result<Self, GenerationError> {
        if options.rows_per_file == 0 {
            return Err(GenerationError::Config(
                "rows_per_file must be positive".to_string(),
            ));
        }
        let generator = RecordGenerator::with_clock(pools, clock)?;
        let writer = ParquetBatchWriter::new(options.out_dir.clone());
        Ok(Self {
            options,
            generator,
            writer,
        })
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn generator(&self) -> &RecordGenerator {
        &self.generator
    }

    /// Random source for a run: seeded when configured, otherwise from the OS.
    pub fn rng(&self) -> ChaCha8Rng {
        match self.options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }

    /// Generate `rows_per_file` records, validate them, and write one file.
    ///
    /// Any failure aborts the whole batch and is tagged with its stage and
    /// the batch size.
    pub fn export_batch(&self, rng: &mut dyn RngCore) -> Result<ExportResult, GenerationError> {
        let start = Instant::now();
        let rows = self.options.rows_per_file;
        let run_id = uuid::Uuid::new_v4().to_string();

        info!(
            run_id = %run_id,
            rows,
            out_dir = %self.options.out_dir.display(),
            "generating batch"
        );

        let outcome = self.export_inner(rng, rows);
        match outcome {
            Ok((records, file)) => {
                let report = ExportReport {
                    run_id,
                    rows_requested: rows,
                    emergencies: records.iter().filter(|r| r.is_emergency).count(),
                    file,
                    duration_ms: start.elapsed().as_millis() as u64,
                };
                info!(
                    run_id = %report.run_id,
                    rows = report.file.rows,
                    emergencies = report.emergencies,
                    duration_ms = report.duration_ms,
                    "batch exported"
                );
                Ok(ExportResult { records, report })
            }
            Err(err) => {
                warn!(run_id = %run_id, error = %err, "batch export failed");
                Err(err)
            }
        }
    }

    fn export_inner(
        &self,
        rng: &mut dyn RngCore,
        rows: usize,
    ) -> Result<(Vec<Record>, WriteSummary), GenerationError> {
        ensure_output_dir(&self.options.out_dir)
            .map_err(|err| err.during(ExportStage::Write, rows))?;

        let records = self
            .generator
            .generate_batch(rng, rows)
            .map_err(|err| err.during(ExportStage::Generate, rows))?;

        for record in &records {
            validate_record(record, self.generator.pools())
                .map_err(|err| GenerationError::from(err).during(ExportStage::Validate, rows))?;
        }

        let file = self
            .writer
            .write_batch_at(&records, self.generator.clock().now())
            .map_err(|err| err.during(ExportStage::Write, rows))?;

        Ok((records, file))
    }
}
