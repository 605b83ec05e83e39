use thiserror::Error;

/// Core error type shared across fuelsynth crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Reference data or options are unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A record breaks one of its cross-field invariants.
    #[error("invariant violated: {0}")]
    Invariant(String),
    /// A record does not fit the fixed column schema.
    #[error("schema violation: {0}")]
    Schema(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
}

/// Convenience alias for results returned by fuelsynth crates.
pub type Result<T> = std::result::Result<T, Error>;
