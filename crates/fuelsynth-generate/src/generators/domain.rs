use fake::Fake;
use fake::faker::name::en::Name;
use rand::{Rng, RngCore};

use fuelsynth_core::{Dock, MAX_SERVICES, ReferencePools};

use crate::errors::GenerationError;
use crate::generators::pick;

pub const DOCK_BAY_MAX: i16 = 128;
/// Levels are the first eight uppercase letters.
pub const DOCK_LEVELS: &[u8] = b"ABCDEFGH";

pub fn dock(rng: &mut dyn RngCore) -> Dock {
    let bay = rng.random_range(1..=DOCK_BAY_MAX);
    let level = DOCK_LEVELS[rng.random_range(0..DOCK_LEVELS.len())];
    Dock {
        bay,
        level: char::from(level).to_string(),
    }
}

/// Franchise first, then one of its ships, so the pair is always consistent.
pub fn ship_and_franchise(
    pools: &ReferencePools,
    rng: &mut dyn RngCore,
) -> Result<(String, String), GenerationError> {
    let franchise = pick(&pools.franchises, "franchises", rng)?;
    let ship = pick(&franchise.ships, &franchise.name, rng)?;
    Ok((ship.clone(), franchise.name.clone()))
}

pub fn captain_name(rng: &mut dyn RngCore) -> String {
    Name().fake_with_rng(rng)
}

/// 1..=4 distinct services, drawn without replacement.
pub fn services(
    pools: &ReferencePools,
    rng: &mut dyn RngCore,
) -> Result<Vec<String>, GenerationError> {
    let menu = &pools.service_menu;
    if menu.len() < MAX_SERVICES {
        return Err(GenerationError::Config(format!(
            "service_menu needs at least {MAX_SERVICES} entries"
        )));
    }
    let amount = rng.random_range(1..=MAX_SERVICES);
    Ok(rand::seq::index::sample(rng, menu.len(), amount)
        .into_iter()
        .map(|idx| menu[idx].clone())
        .collect())
}
