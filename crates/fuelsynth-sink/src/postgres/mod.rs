use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::Result;
use crate::redaction::redact_connection_string;
use crate::row::SinkRow;
use crate::sink::Sink;

mod queries;

pub use queries::{MAX_ROWS_PER_STATEMENT, TABLE_NAME};

/// Sink writing into the `fuel_transactions` table.
#[derive(Debug, Clone)]
pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    /// Create a sink using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let redacted = redact_connection_string(database_url);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;
        info!(url = %redacted.redacted, "connected to postgres");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Wait for open connections to be returned and shut the pool down.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Sink for PostgresSink {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn ensure_table(&self) -> Result<()> {
        sqlx::query(queries::CREATE_TABLE)
            .execute(&self.pool)
            .await?;
        info!(table = TABLE_NAME, "ensured sink table exists");
        Ok(())
    }

    async fn upsert(&self, rows: &[SinkRow]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for chunk in rows.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut insert = queries::insert_ignoring_conflicts(chunk);
            inserted += insert.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        Ok(inserted)
    }
}
