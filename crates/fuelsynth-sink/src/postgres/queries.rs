use sqlx::{Postgres, QueryBuilder};

use crate::row::{SINK_COLUMNS, SinkRow};

pub const TABLE_NAME: &str = "fuel_transactions";

/// Postgres caps a statement at 65535 bind parameters.
pub const MAX_ROWS_PER_STATEMENT: usize = 1_000;

pub const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS fuel_transactions (
    transaction_id   TEXT PRIMARY KEY,
    station_id       INTEGER NOT NULL,
    dock_bay         SMALLINT NOT NULL,
    dock_level       TEXT NOT NULL,
    ship_name        TEXT NOT NULL,
    franchise        TEXT NOT NULL,
    captain_name     TEXT NOT NULL,
    species          TEXT NOT NULL,
    fuel_type        TEXT NOT NULL,
    fuel_units       NUMERIC(10, 2) NOT NULL,
    price_per_unit   NUMERIC(8, 2) NOT NULL,
    total_cost       NUMERIC(12, 2) NOT NULL,
    services         TEXT[] NOT NULL,
    is_emergency     BOOLEAN NOT NULL,
    visited_at       TIMESTAMPTZ NOT NULL,
    arrival_date     DATE NOT NULL,
    coords_x         DOUBLE PRECISION NOT NULL,
    coords_y         DOUBLE PRECISION NOT NULL
)
"#;

/// Multi-row insert that skips keys already present.
pub fn insert_ignoring_conflicts(rows: &[SinkRow]) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {TABLE_NAME} ({}) ",
        SINK_COLUMNS.join(", ")
    ));
    builder.push_values(rows, |mut values, row| {
        values
            .push_bind(row.transaction_id.clone())
            .push_bind(row.station_id)
            .push_bind(row.dock_bay)
            .push_bind(row.dock_level.clone())
            .push_bind(row.ship_name.clone())
            .push_bind(row.franchise.clone())
            .push_bind(row.captain_name.clone())
            .push_bind(row.species.clone())
            .push_bind(row.fuel_type.clone())
            .push_bind(row.fuel_units)
            .push_bind(row.price_per_unit)
            .push_bind(row.total_cost)
            .push_bind(row.services.clone())
            .push_bind(row.is_emergency)
            .push_bind(row.visited_at)
            .push_bind(row.arrival_date)
            .push_bind(row.coords_x)
            .push_bind(row.coords_y);
    });
    builder.push(" ON CONFLICT (transaction_id) DO NOTHING");
    builder
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;

    fn row() -> SinkRow {
        SinkRow {
            transaction_id: "20250101000000000000-abcdefghij".to_string(),
            station_id: 1234,
            dock_bay: 7,
            dock_level: "C".to_string(),
            ship_name: "Rocinante".to_string(),
            franchise: "The Expanse".to_string(),
            captain_name: "James Holden".to_string(),
            species: "Human".to_string(),
            fuel_type: "Deuterium".to_string(),
            fuel_units: Decimal::new(10_000, 2),
            price_per_unit: Decimal::new(1_235, 2),
            total_cost: Decimal::new(123_500, 2),
            services: vec!["hull patch".to_string()],
            is_emergency: false,
            visited_at: Utc
                .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .single()
                .expect("valid timestamp"),
            arrival_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
            coords_x: 1.5,
            coords_y: -2.5,
        }
    }

    #[test]
    fn chunk_stays_under_bind_limit() {
        assert!(MAX_ROWS_PER_STATEMENT * SINK_COLUMNS.len() <= u16::MAX as usize);
    }

    #[test]
    fn insert_targets_every_column_and_skips_conflicts() {
        let sql = insert_ignoring_conflicts(&[row(), row()]).into_sql();
        assert!(sql.starts_with("INSERT INTO fuel_transactions (transaction_id, station_id,"));
        assert!(sql.contains("coords_x, coords_y) VALUES ($1, $2,"));
        assert!(sql.contains("$36)"));
        assert!(sql.ends_with("ON CONFLICT (transaction_id) DO NOTHING"));
    }
}
