use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file: {0}")]
    Io(#[from] io::Error),
    #[error("cannot install subscriber: {0}")]
    Init(String),
}

/// Human-readable events on stderr, filtered by `RUST_LOG` (default `info`),
/// plus JSON lines appended to `log_file` when one is given.
pub fn init_logging(log_file: Option<&Path>) -> Result<(), LoggingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_layer_appends_json_lines() {
        let mut path = std::env::temp_dir();
        path.push(format!("fuelsynth_log_{}.jsonl", uuid::Uuid::new_v4()));

        init_logging(Some(&path)).expect("install subscriber");
        tracing::warn!(rows = 3, "batch export failed");

        let content = std::fs::read_to_string(&path).expect("read log file");
        let line = content
            .lines()
            .find(|line| line.contains("batch export failed"))
            .expect("logged event");
        let event: serde_json::Value = serde_json::from_str(line).expect("json line");
        assert_eq!(event["level"], "WARN");
        assert_eq!(event["fields"]["rows"], 3);
        assert!(event["timestamp"].as_str().is_some_and(|ts| ts.ends_with('Z')));
    }
}
