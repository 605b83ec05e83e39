use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;

use fuelsynth_core::{ReferencePools, round_money, validate_record};
use fuelsynth_generate::{FixedClock, RecordGenerator, SystemClock};

fn fixed_generator() -> RecordGenerator {
    let now = Utc
        .with_ymd_and_hms(2025, 1, 1, 23, 59, 59)
        .single()
        .expect("valid timestamp");
    RecordGenerator::with_clock(ReferencePools::default(), Box::new(FixedClock(now)))
        .expect("valid pools")
}

#[test]
fn generated_records_hold_every_invariant() {
    let generator = RecordGenerator::with_clock(ReferencePools::default(), Box::new(SystemClock))
        .expect("valid pools");
    let pools = generator.pools().clone();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let records = generator.generate_batch(&mut rng, 2_000).expect("batch");
    assert_eq!(records.len(), 2_000);

    for record in &records {
        validate_record(record, &pools).expect("record invariants");

        assert_eq!(
            record.total_cost,
            round_money(record.fuel_units * record.price_per_unit)
        );
        assert_eq!(record.arrival_date, record.visited_at.date_naive());

        let ships = pools.ships_of(&record.franchise).expect("known franchise");
        assert!(ships.contains(&record.ship_name));

        assert!((1..=4).contains(&record.services.len()));
        let unique: BTreeSet<_> = record.services.iter().collect();
        assert_eq!(unique.len(), record.services.len());

        assert!((1000..=9999).contains(&record.station_id));
        assert!((1..=128).contains(&record.dock.bay));
        assert!(record.fuel_units >= Decimal::new(50, 0));
        assert!(record.fuel_units <= Decimal::new(5000, 0));
        assert!(record.price_per_unit.scale() <= 2);
        assert!(record.total_cost.scale() <= 2);
        assert!((-10_000.0..=10_000.0).contains(&record.coords_x));
        assert!((-10_000.0..=10_000.0).contains(&record.coords_y));
    }
}

#[test]
fn seeded_generation_is_reproducible() {
    let generator = fixed_generator();

    let mut rng_a = ChaCha8Rng::seed_from_u64(7);
    let mut rng_b = ChaCha8Rng::seed_from_u64(7);
    let batch_a = generator.generate_batch(&mut rng_a, 50).expect("batch a");
    let batch_b = generator.generate_batch(&mut rng_b, 50).expect("batch b");

    assert_eq!(batch_a, batch_b);
}

#[test]
fn transaction_ids_start_with_the_visit_instant() {
    let generator = fixed_generator();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let records = generator.generate_batch(&mut rng, 200).expect("batch");

    let ids: BTreeSet<_> = records.iter().map(|r| r.transaction_id.as_str()).collect();
    assert_eq!(ids.len(), records.len(), "ids should not collide");
    assert!(
        records
            .iter()
            .all(|r| r.transaction_id.starts_with("20250101235959000000-"))
    );
}

#[test]
fn empty_batch_is_not_an_error() {
    let generator = fixed_generator();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let records = generator.generate_batch(&mut rng, 0).expect("empty batch");
    assert!(records.is_empty());
}

#[test]
fn invalid_pools_are_rejected_before_generation() {
    let mut pools = ReferencePools::default();
    pools.fuel_types.clear();
    assert!(RecordGenerator::new(pools).is_err());
}
