use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Docking position inside a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dock {
    pub bay: i16,
    pub level: String,
}

/// One synthetic fuel transaction.
///
/// Records are built by the generator and never mutated afterwards. Derived
/// fields (`total_cost`, `arrival_date`) are only consistent when produced by
/// the assembler; use [`crate::validate_record`] to check a record from any
/// other source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub transaction_id: String,
    pub station_id: i32,
    pub dock: Dock,
    pub ship_name: String,
    pub franchise: String,
    pub captain_name: String,
    pub species: String,
    pub fuel_type: String,
    /// Quantity with two fractional digits.
    pub fuel_units: Decimal,
    pub price_per_unit: Decimal,
    pub total_cost: Decimal,
    pub services: Vec<String>,
    pub is_emergency: bool,
    pub visited_at: DateTime<Utc>,
    pub arrival_date: NaiveDate,
    pub coords_x: f64,
    pub coords_y: f64,
}
