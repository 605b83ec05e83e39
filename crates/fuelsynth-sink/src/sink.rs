use async_trait::async_trait;
use tracing::info;

use fuelsynth_core::Record;

use crate::error::Result;
use crate::row::{SinkRow, flatten};

/// Destination for flattened rows keyed by `transaction_id`.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Create the destination table when it does not exist yet.
    async fn ensure_table(&self) -> Result<()>;

    /// Insert rows, ignoring keys that are already present. Returns the
    /// number of rows actually inserted.
    async fn upsert(&self, rows: &[SinkRow]) -> Result<u64>;
}

/// Flatten a batch and load it into `sink`.
pub async fn load_batch(sink: &dyn Sink, records: &[Record]) -> Result<u64> {
    let rows = flatten(records);
    let inserted = sink.upsert(&rows).await?;
    info!(
        engine = sink.engine(),
        rows = rows.len(),
        inserted,
        skipped = rows.len() as u64 - inserted,
        "loaded batch into sink"
    );
    Ok(inserted)
}
