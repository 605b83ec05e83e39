use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use fuelsynth_core::Record;

/// Destination columns, in insert order.
pub const SINK_COLUMNS: [&str; 18] = [
    "transaction_id",
    "station_id",
    "dock_bay",
    "dock_level",
    "ship_name",
    "franchise",
    "captain_name",
    "species",
    "fuel_type",
    "fuel_units",
    "price_per_unit",
    "total_cost",
    "services",
    "is_emergency",
    "visited_at",
    "arrival_date",
    "coords_x",
    "coords_y",
];

/// A record flattened for a relational table: the dock struct becomes two
/// columns and decimals stay exact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkRow {
    pub transaction_id: String,
    pub station_id: i32,
    pub dock_bay: i16,
    pub dock_level: String,
    pub ship_name: String,
    pub franchise: String,
    pub captain_name: String,
    pub species: String,
    pub fuel_type: String,
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

impl From<&Record> for SinkRow {
    fn from(record: &Record) -> Self {
        Self {
            transaction_id: record.transaction_id.clone(),
            station_id: record.station_id,
            dock_bay: record.dock.bay,
            dock_level: record.dock.level.clone(),
            ship_name: record.ship_name.clone(),
            franchise: record.franchise.clone(),
            captain_name: record.captain_name.clone(),
            species: record.species.clone(),
            fuel_type: record.fuel_type.clone(),
            fuel_units: record.fuel_units,
            price_per_unit: record.price_per_unit,
            total_cost: record.total_cost,
            services: record.services.clone(),
            is_emergency: record.is_emergency,
            visited_at: record.visited_at,
            arrival_date: record.arrival_date,
            coords_x: record.coords_x,
            coords_y: record.coords_y,
        }
    }
}

pub fn flatten(records: &[Record]) -> Vec<SinkRow> {
    records.iter().map(SinkRow::from).collect()
}
