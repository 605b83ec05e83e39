//! Core contracts for fuelsynth.
//!
//! This crate defines the fuel transaction record, the reference value pools,
//! the fixed output schema, and the invariant checks shared by the generator,
//! the file writer, and the sinks.

pub mod error;
pub mod pools;
pub mod record;
pub mod schema;
pub mod validation;

pub use error::{Error, Result};
pub use pools::{Franchise, MAX_SERVICES, ReferencePools};
pub use record::{Dock, Record};
pub use schema::{
    ColumnKind, ColumnSpec, FUEL_SCHEMA, MONEY_SCALE, PRICE_PRECISION, TOTAL_PRECISION,
    decimal_fits,
};
pub use validation::{round_money, total_cost, validate_record};
