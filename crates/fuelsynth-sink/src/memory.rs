use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, SinkError};
use crate::row::SinkRow;
use crate::sink::Sink;

/// Ordered in-memory sink with insert-or-ignore semantics.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<BTreeMap<String, SinkRow>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, transaction_id: &str) -> Result<Option<SinkRow>> {
        Ok(self.lock()?.get(transaction_id).cloned())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Stored rows ordered by key.
    pub fn rows(&self) -> Result<Vec<SinkRow>> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, SinkRow>>> {
        self.rows
            .lock()
            .map_err(|_| SinkError::Invalid("memory sink lock poisoned".to_string()))
    }
}

#[async_trait]
impl Sink for MemorySink {
    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn ensure_table(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, rows: &[SinkRow]) -> Result<u64> {
        let mut stored = self.lock()?;
        let mut inserted = 0;
        for row in rows {
            if !stored.contains_key(&row.transaction_id) {
                stored.insert(row.transaction_id.clone(), row.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}
