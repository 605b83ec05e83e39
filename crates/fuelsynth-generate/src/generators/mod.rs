//! Field generators.
//!
//! Each function draws one semantically valid value from an explicit random
//! source. Generators never look at other fields; derived fields are the
//! assembler's job.

use rand::{Rng, RngCore};

use crate::errors::GenerationError;

pub mod domain;
pub mod primitives;

pub use domain::{captain_name, dock, services, ship_and_franchise};
pub use primitives::{
    coordinate, is_emergency, money_decimal, station_id, transaction_id,
};

/// Uniform categorical draw from a pool.
pub fn pick<'a, T>(
    values: &'a [T],
    pool: &str,
    rng: &mut dyn RngCore,
) -> Result<&'a T, GenerationError> {
    if values.is_empty() {
        return Err(GenerationError::Config(format!("{pool} pool is empty")));
    }
    let idx = rng.random_range(0..values.len());
    Ok(&values[idx])
}
