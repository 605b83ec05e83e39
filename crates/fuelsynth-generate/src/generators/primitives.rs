use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};
use rust_decimal::Decimal;

use fuelsynth_core::round_money;

use crate::errors::GenerationError;

pub const STATION_ID_MIN: i32 = 1000;
pub const STATION_ID_MAX: i32 = 9999;
pub const COORD_LIMIT: f64 = 10_000.0;
pub const EMERGENCY_PROBABILITY: f64 = 0.03;

const ID_SUFFIX_LEN: usize = 10;
const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// `YYYYMMDDHHMMSSffffff-xxxxxxxxxx`: UTC microsecond prefix plus a random
/// lowercase alphanumeric suffix. Collision-improbable, not collision-free.
pub fn transaction_id(now: DateTime<Utc>, rng: &mut dyn RngCore) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(ID_CHARSET[rng.random_range(0..ID_CHARSET.len())]))
        .collect();
    format!("{}-{suffix}", now.format("%Y%m%d%H%M%S%6f"))
}

pub fn station_id(rng: &mut dyn RngCore) -> i32 {
    rng.random_range(STATION_ID_MIN..=STATION_ID_MAX)
}

/// Uniform draw in `[min, max]`, quantized half-up to cents.
///
/// The float is converted from its exact binary value before rounding so the
/// cent boundary is decided in decimal arithmetic.
pub fn money_decimal(
    min: f64,
    max: f64,
    rng: &mut dyn RngCore,
) -> Result<Decimal, GenerationError> {
    if !(min.is_finite() && max.is_finite()) || min > max {
        return Err(GenerationError::Config(format!(
            "invalid money range [{min}, {max}]"
        )));
    }
    let value = rng.random_range(min..=max);
    Decimal::from_f64_retain(value)
        .map(round_money)
        .ok_or_else(|| GenerationError::Generation(format!("cannot quantize {value}")))
}

pub fn coordinate(rng: &mut dyn RngCore) -> f64 {
    rng.random_range(-COORD_LIMIT..=COORD_LIMIT)
}

pub fn is_emergency(rng: &mut dyn RngCore) -> bool {
    rng.random_bool(EMERGENCY_PROBABILITY)
}
