use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest service subset drawn for a single record.
pub const MAX_SERVICES: usize = 4;

const FUEL_TYPES: &[&str] = &[
    "HyperMatter",
    "Antimatter",
    "Hydrogen",
    "Deuterium",
    "Tri-Tachyon",
    "QuantumFlux",
    "Plasma",
    "DarkIon",
    "Helium-3",
];

const SERVICE_MENU: &[&str] = &[
    "hull patch",
    "oxygen refill",
    "hyperdrive check",
    "radiation scrub",
    "life-support tune-up",
    "gyro recalibration",
    "sensor alignment",
    "cargo sealant",
    "RCS fuel",
    "shield recharge",
];

const FRANCHISE_SHIPS: &[(&str, &[&str])] = &[
    (
        "Star Wars",
        &["Millennium Falcon", "X-Wing", "Slave I", "TIE Advanced", "Ghost"],
    ),
    (
        "Mass Effect",
        &["SSV Normandy SR-1", "SSV Normandy SR-2", "Tempest"],
    ),
    (
        "Halo",
        &["Pillar of Autumn", "In Amber Clad", "Spirit of Fire"],
    ),
    (
        "Star Trek",
        &["USS Enterprise", "USS Defiant", "USS Voyager", "USS Discovery"],
    ),
    ("Firefly", &["Serenity"]),
    ("The Expanse", &["Rocinante", "Canterbury", "Agatha King"]),
    (
        "Elite Dangerous",
        &["Cobra Mk III", "Asp Explorer", "Anaconda"],
    ),
    (
        "No Man's Sky",
        &["Exotic S-Class", "Hauler C-Class", "Explorer A-Class"],
    ),
    ("Dune", &["Heighliner", "Ornithopter"]),
    ("Battlestar Galactica", &["Galactica", "Pegasus", "Raptor"]),
    (
        "Star Citizen",
        &["Constellation Andromeda", "Cutlass Black", "Carrack"],
    ),
    ("Alien", &["USCSS Nostromo", "USCSS Prometheus"]),
];

const SPECIES: &[&str] = &[
    "Human",
    "Asari",
    "Turian",
    "Sangheili",
    "Vulcan",
    "Twi'lek",
    "Belter",
    "Kree",
    "Time Lord",
    "Zabrak",
    "Klingon",
    "Protoss",
];

/// A franchise and the ships that may be paired with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Franchise {
    pub name: String,
    pub ships: Vec<String>,
}

/// Reference data every random draw is bounded by.
///
/// Built once at startup (defaults or a TOML file), validated, then shared
/// read-only with the generator. Franchise order is preserved so that a
/// seeded run draws the same pairs every time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencePools {
    pub fuel_types: Vec<String>,
    pub service_menu: Vec<String>,
    pub franchises: Vec<Franchise>,
    pub species: Vec<String>,
}

impl Default for ReferencePools {
    fn default() -> Self {
        Self {
            fuel_types: owned(FUEL_TYPES),
            service_menu: owned(SERVICE_MENU),
            franchises: FRANCHISE_SHIPS
                .iter()
                .map(|(name, ships)| Franchise {
                    name: (*name).to_string(),
                    ships: owned(ships),
                })
                .collect(),
            species: owned(SPECIES),
        }
    }
}

impl ReferencePools {
    /// Load pools from a TOML file and validate them.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let pools: ReferencePools = toml::from_str(content)?;
        pools.validate()?;
        Ok(pools)
    }

    /// Reject pools that would make a draw impossible or ambiguous.
    pub fn validate(&self) -> Result<()> {
        non_empty("fuel_types", &self.fuel_types)?;
        non_empty("species", &self.species)?;
        non_empty("service_menu", &self.service_menu)?;

        if self.service_menu.len() < MAX_SERVICES {
            return Err(Error::Config(format!(
                "service_menu needs at least {MAX_SERVICES} entries, found {}",
                self.service_menu.len()
            )));
        }

        let mut services = BTreeSet::new();
        for service in &self.service_menu {
            if !services.insert(service.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate service in service_menu: {service}"
                )));
            }
        }

        if self.franchises.is_empty() {
            return Err(Error::Config("franchises must not be empty".to_string()));
        }

        let mut names = BTreeSet::new();
        for franchise in &self.franchises {
            if !names.insert(franchise.name.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate franchise: {}",
                    franchise.name
                )));
            }
            if franchise.ships.is_empty() {
                return Err(Error::Config(format!(
                    "franchise '{}' has no ships",
                    franchise.name
                )));
            }
        }

        Ok(())
    }

    pub fn ships_of(&self, franchise: &str) -> Option<&[String]> {
        self.franchises
            .iter()
            .find(|entry| entry.name == franchise)
            .map(|entry| entry.ships.as_slice())
    }
}

fn non_empty(name: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(Error::Config(format!("{name} must not be empty")));
    }
    Ok(())
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}
