//! Relational sinks for generated fuel transactions.
//!
//! Records are flattened into [`SinkRow`]s and inserted keyed by
//! `transaction_id`; rows whose key already exists are skipped.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod redaction;
pub mod row;
pub mod sink;

pub use error::{Result, SinkError};
pub use memory::MemorySink;
pub use postgres::{PostgresSink, TABLE_NAME};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use row::{SINK_COLUMNS, SinkRow, flatten};
pub use sink::{Sink, load_batch};
