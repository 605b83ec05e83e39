use std::path::Path;
use std::pin::pin;
use std::time::Duration;

use rand::RngCore;
use serde::Serialize;
use tracing::{info, warn};

use fuelsynth_core::{FUEL_SCHEMA, Record, ReferencePools};
use fuelsynth_generate::{ExportEngine, ExportReport, read_batch_file};
use fuelsynth_sink::{PostgresSink, Sink, load_batch, redact_connection_string};

use crate::{CliError, ExportArgs, InspectArgs, RunArgs};

/// Export report printed after each batch, with the sink outcome if any.
#[derive(Debug, Serialize)]
struct BatchOutcome {
    #[serde(flatten)]
    report: ExportReport,
    inserted: Option<u64>,
}

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    path: &'a Path,
    bytes: u64,
    rows: usize,
    columns: usize,
    first: Option<&'a Record>,
}

pub async fn export(args: ExportArgs) -> Result<(), CliError> {
    let engine = build_engine(&args)?;
    let sink = connect_sink(args.database_url.as_deref()).await?;

    let mut rng = engine.rng();
    let outcome = export_once(&engine, &mut rng, sink.as_ref()).await;
    if let Some(sink) = &sink {
        sink.close().await;
    }
    print_json(&outcome?)
}

/// Export one batch per period until interrupted.
pub async fn run(args: RunArgs) -> Result<(), CliError> {
    let engine = build_engine(&args.export)?;
    let sink = connect_sink(args.export.database_url.as_deref()).await?;
    let period = Duration::from_secs(args.period_seconds);

    // Spawned so the handler is installed before the first batch starts.
    let interrupt = tokio::spawn(tokio::signal::ctrl_c());
    let shutdown = async move {
        match interrupt.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(error = %err, "failed to listen for interrupt");
                std::future::pending::<()>().await;
            }
            Err(err) => {
                warn!(error = %err, "interrupt listener stopped");
                std::future::pending::<()>().await;
            }
        }
    };

    info!(
        period_seconds = args.period_seconds,
        rows = engine.options().rows_per_file,
        "export loop started"
    );
    let result = export_loop(&engine, sink.as_ref(), period, shutdown).await;

    if let Some(sink) = &sink {
        sink.close().await;
    }
    result.map(|_| ())
}

/// Export batches every `period` until `shutdown` resolves. A shutdown
/// requested during a batch takes effect once that batch is written.
async fn export_loop<F>(
    engine: &ExportEngine,
    sink: Option<&PostgresSink>,
    period: Duration,
    shutdown: F,
) -> Result<u64, CliError>
where
    F: Future<Output = ()>,
{
    let mut shutdown = pin!(shutdown);
    let mut rng = engine.rng();
    let mut batches: u64 = 0;

    loop {
        let outcome = export_once(engine, &mut rng, sink).await?;
        batches += 1;
        print_json(&outcome)?;

        tokio::select! {
            _ = &mut shutdown => {
                info!(batches, "interrupt received, stopping export loop");
                return Ok(batches);
            }
            _ = tokio::time::sleep(period) => {}
        }
    }
}

pub fn schema() -> Result<(), CliError> {
    print_json(&FUEL_SCHEMA)
}

pub fn inspect(args: InspectArgs) -> Result<(), CliError> {
    let bytes = std::fs::metadata(&args.file)?.len();
    let records = read_batch_file(&args.file)?;
    print_json(&InspectReport {
        path: &args.file,
        bytes,
        rows: records.len(),
        columns: FUEL_SCHEMA.len(),
        first: records.first(),
    })
}

fn build_engine(args: &ExportArgs) -> Result<ExportEngine, CliError> {
    let pools = load_pools(args.pools.as_deref())?;
    let options = args.options()?;
    Ok(ExportEngine::new(options, pools)?)
}

fn load_pools(path: Option<&Path>) -> Result<ReferencePools, CliError> {
    match path {
        Some(path) => {
            let pools = ReferencePools::from_toml_file(path)?;
            info!(path = %path.display(), "loaded value pools");
            Ok(pools)
        }
        None => Ok(ReferencePools::default()),
    }
}

async fn connect_sink(database_url: Option<&str>) -> Result<Option<PostgresSink>, CliError> {
    let Some(url) = database_url else {
        return Ok(None);
    };
    if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
        return Err(CliError::InvalidConfig(format!(
            "unsupported database url {}",
            redact_connection_string(url).redacted
        )));
    }
    let sink = PostgresSink::connect(url).await?;
    if let Err(err) = sink.ensure_table().await {
        sink.close().await;
        return Err(err.into());
    }
    Ok(Some(sink))
}

async fn export_once(
    engine: &ExportEngine,
    rng: &mut dyn RngCore,
    sink: Option<&PostgresSink>,
) -> Result<BatchOutcome, CliError> {
    let result = engine.export_batch(rng)?;
    let inserted = match sink {
        Some(sink) => Some(load_batch(sink, &result.records).await?),
        None => None,
    };
    Ok(BatchOutcome {
        report: result.report,
        inserted,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use fuelsynth_generate::ExportOptions;

    use super::*;

    fn engine(label: &str, rows_per_file: usize) -> (ExportEngine, PathBuf) {
        let mut out_dir = std::env::temp_dir();
        out_dir.push(format!("fuelsynth_cli_{label}_{}", uuid::Uuid::new_v4()));
        let options = ExportOptions {
            out_dir: out_dir.clone(),
            rows_per_file,
            seed: Some(17),
        };
        let engine = ExportEngine::new(options, ReferencePools::default()).expect("engine");
        (engine, out_dir)
    }

    #[tokio::test]
    async fn shutdown_requested_during_a_batch_stops_after_it() {
        let (engine, out_dir) = engine("first_batch", 12);

        let batches = export_loop(&engine, None, Duration::from_secs(3600), async {})
            .await
            .expect("loop");

        assert_eq!(batches, 1);
        let files: Vec<_> = std::fs::read_dir(&out_dir)
            .expect("list dir")
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect();
        assert_eq!(files.len(), 1);
        assert_eq!(read_batch_file(&files[0]).expect("read").len(), 12);
    }

    #[tokio::test]
    async fn loop_keeps_exporting_until_shutdown() {
        let (engine, _out_dir) = engine("periodic", 3);
        let shutdown = tokio::time::sleep(Duration::from_millis(300));

        let batches = export_loop(&engine, None, Duration::from_millis(10), shutdown)
            .await
            .expect("loop");

        assert!(batches >= 2, "expected several batches, got {batches}");
    }

    #[tokio::test]
    async fn failing_batch_stops_the_loop() {
        let blocker = std::env::temp_dir().join(format!("fuelsynth_cli_{}", uuid::Uuid::new_v4()));
        std::fs::write(&blocker, b"not a directory").expect("create blocking file");
        let options = ExportOptions {
            out_dir: blocker.join("nested"),
            rows_per_file: 2,
            seed: Some(1),
        };
        let engine = ExportEngine::new(options, ReferencePools::default()).expect("engine");

        let result = export_loop(
            &engine,
            None,
            Duration::from_millis(10),
            std::future::pending(),
        )
        .await;

        assert!(matches!(result, Err(CliError::Export(_))));
    }
}
