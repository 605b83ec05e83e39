use std::collections::BTreeSet;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, Result};
use crate::pools::{MAX_SERVICES, ReferencePools};
use crate::record::Record;
use crate::schema::MONEY_SCALE;

/// Round half-up (midpoint away from zero) to the monetary scale.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `round_half_up(fuel_units * price_per_unit, 2)`, failing on overflow.
pub fn total_cost(fuel_units: Decimal, price_per_unit: Decimal) -> Result<Decimal> {
    fuel_units
        .checked_mul(price_per_unit)
        .map(round_money)
        .ok_or_else(|| {
            Error::Invariant(format!(
                "total cost overflows: {fuel_units} * {price_per_unit}"
            ))
        })
}

/// Validate the cross-field invariants of a record.
///
/// This checks:
/// - the ship belongs to the franchise
/// - the total cost is the rounded product of units and unit price
/// - the arrival date is the date of the visit
/// - services are 1..=4 distinct menu entries
/// - the categorical fields come from the pools
pub fn validate_record(record: &Record, pools: &ReferencePools) -> Result<()> {
    let id = &record.transaction_id;

    let ships = pools.ships_of(&record.franchise).ok_or_else(|| {
        Error::Invariant(format!("{id}: unknown franchise '{}'", record.franchise))
    })?;
    if !ships.iter().any(|ship| ship == &record.ship_name) {
        return Err(Error::Invariant(format!(
            "{id}: ship '{}' does not belong to '{}'",
            record.ship_name, record.franchise
        )));
    }

    let expected = total_cost(record.fuel_units, record.price_per_unit)?;
    if record.total_cost != expected {
        return Err(Error::Invariant(format!(
            "{id}: total_cost {} != {expected}",
            record.total_cost
        )));
    }

    if record.arrival_date != record.visited_at.date_naive() {
        return Err(Error::Invariant(format!(
            "{id}: arrival_date {} is not the date of {}",
            record.arrival_date, record.visited_at
        )));
    }

    if record.services.is_empty() || record.services.len() > MAX_SERVICES {
        return Err(Error::Invariant(format!(
            "{id}: expected 1..={MAX_SERVICES} services, found {}",
            record.services.len()
        )));
    }
    let mut seen = BTreeSet::new();
    for service in &record.services {
        if !seen.insert(service.as_str()) {
            return Err(Error::Invariant(format!(
                "{id}: duplicate service '{service}'"
            )));
        }
        if !pools.service_menu.contains(service) {
            return Err(Error::Invariant(format!(
                "{id}: service '{service}' is not on the menu"
            )));
        }
    }

    if !pools.fuel_types.contains(&record.fuel_type) {
        return Err(Error::Invariant(format!(
            "{id}: unknown fuel type '{}'",
            record.fuel_type
        )));
    }
    if !pools.species.contains(&record.species) {
        return Err(Error::Invariant(format!(
            "{id}: unknown species '{}'",
            record.species
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::record::Dock;

    fn sample_record() -> Record {
        let visited_at = Utc
            .with_ymd_and_hms(2025, 1, 1, 23, 59, 59)
            .single()
            .expect("valid timestamp");
        Record {
            transaction_id: "20250101235959000000-abcdefghij".to_string(),
            station_id: 1234,
            dock: Dock {
                bay: 7,
                level: "C".to_string(),
            },
            ship_name: "Serenity".to_string(),
            franchise: "Firefly".to_string(),
            captain_name: "Mal Reynolds".to_string(),
            species: "Human".to_string(),
            fuel_type: "Plasma".to_string(),
            fuel_units: Decimal::new(10_000, 2),
            price_per_unit: Decimal::new(1_235, 2),
            total_cost: Decimal::new(123_500, 2),
            services: vec!["hull patch".to_string(), "RCS fuel".to_string()],
            is_emergency: false,
            visited_at,
            arrival_date: visited_at.date_naive(),
            coords_x: 12.5,
            coords_y: -8000.0,
        }
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_money(Decimal::new(12_345, 3)), Decimal::new(1_235, 2));
        assert_eq!(round_money(Decimal::new(-12_345, 3)), Decimal::new(-1_235, 2));
        assert_eq!(round_money(Decimal::new(12_344, 3)), Decimal::new(1_234, 2));
    }

    #[test]
    fn hundred_units_at_quantized_price() {
        let price = round_money(Decimal::new(12_345, 3));
        let total = total_cost(Decimal::new(10_000, 2), price).expect("total");
        assert_eq!(total, Decimal::new(123_500, 2));
        assert_eq!(total.to_string(), "1235.00");
    }

    #[test]
    fn accepts_consistent_record() {
        validate_record(&sample_record(), &ReferencePools::default()).expect("valid record");
    }

    #[test]
    fn rejects_foreign_ship() {
        let mut record = sample_record();
        record.ship_name = "Galactica".to_string();
        assert!(matches!(
            validate_record(&record, &ReferencePools::default()),
            Err(Error::Invariant(_))
        ));
    }

    #[test]
    fn rejects_drifted_total() {
        let mut record = sample_record();
        record.total_cost = Decimal::new(123_501, 2);
        assert!(matches!(
            validate_record(&record, &ReferencePools::default()),
            Err(Error::Invariant(_))
        ));
    }

    #[test]
    fn rejects_arrival_date_mismatch() {
        let mut record = sample_record();
        record.arrival_date = record.arrival_date.succ_opt().expect("next day");
        assert!(matches!(
            validate_record(&record, &ReferencePools::default()),
            Err(Error::Invariant(_))
        ));
    }

    #[test]
    fn rejects_duplicate_services() {
        let mut record = sample_record();
        record.services = vec!["hull patch".to_string(), "hull patch".to_string()];
        assert!(matches!(
            validate_record(&record, &ReferencePools::default()),
            Err(Error::Invariant(_))
        ));
    }
}
