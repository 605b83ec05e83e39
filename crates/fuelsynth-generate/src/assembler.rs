use rand::RngCore;

use fuelsynth_core::{Record, ReferencePools, total_cost};

use crate::clock::{Clock, SystemClock};
use crate::errors::GenerationError;
use crate::generators::{self, pick};

pub const FUEL_UNITS_RANGE: (f64, f64) = (50.0, 5000.0);
pub const PRICE_PER_UNIT_RANGE: (f64, f64) = (10.0, 800.0);

/// Builds complete records from the field generators.
///
/// This is the only place derived fields are computed: `total_cost` from the
/// already drawn quantity and unit price, `arrival_date` from the visit
/// instant. With a seeded RNG and a [`crate::FixedClock`] the output is fully
/// reproducible.
pub struct RecordGenerator {
    pools: ReferencePools,
    clock: Box<dyn Clock>,
}

impl RecordGenerator {
    pub fn new(pools: ReferencePools) -> Result<Self, GenerationError> {
        Self::with_clock(pools, Box::new(SystemClock))
    }

    pub fn with_clock(
        pools: ReferencePools,
        clock: Box<dyn Clock>,
    ) -> Result<Self, GenerationError> {
        pools.validate()?;
        Ok(Self { pools, clock })
    }

    pub fn pools(&self) -> &ReferencePools {
        &self.pools
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn generate_record(&self, rng: &mut dyn RngCore) -> Result<Record, GenerationError> {
        let pools = &self.pools;

        let (ship_name, franchise) = generators::ship_and_franchise(pools, rng)?;
        let captain_name = generators::captain_name(rng);
        let species = pick(&pools.species, "species", rng)?.clone();
        let fuel_type = pick(&pools.fuel_types, "fuel_types", rng)?.clone();
        let fuel_units = generators::money_decimal(FUEL_UNITS_RANGE.0, FUEL_UNITS_RANGE.1, rng)?;
        let price_per_unit =
            generators::money_decimal(PRICE_PER_UNIT_RANGE.0, PRICE_PER_UNIT_RANGE.1, rng)?;
        let total_cost = total_cost(fuel_units, price_per_unit)
            .map_err(|err| GenerationError::Generation(err.to_string()))?;
        let visited_at = self.clock.now();
        let services = generators::services(pools, rng)?;
        let is_emergency = generators::is_emergency(rng);
        let coords_x = generators::coordinate(rng);
        let coords_y = generators::coordinate(rng);

        Ok(Record {
            transaction_id: generators::transaction_id(visited_at, rng),
            station_id: generators::station_id(rng),
            dock: generators::dock(rng),
            ship_name,
            franchise,
            captain_name,
            species,
            fuel_type,
            fuel_units,
            price_per_unit,
            total_cost,
            services,
            is_emergency,
            visited_at,
            arrival_date: visited_at.date_naive(),
            coords_x,
            coords_y,
        })
    }

    /// `n` independent records; `n == 0` yields an empty batch.
    pub fn generate_batch(
        &self,
        rng: &mut dyn RngCore,
        n: usize,
    ) -> Result<Vec<Record>, GenerationError> {
        let mut records = Vec::with_capacity(n);
        for _ in 0..n {
            records.push(self.generate_record(rng)?);
        }
        Ok(records)
    }
}

impl std::fmt::Debug for RecordGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordGenerator")
            .field("pools", &self.pools)
            .finish_non_exhaustive()
    }
}
