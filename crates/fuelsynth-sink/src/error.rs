use thiserror::Error;

/// Errors raised while loading rows into a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid sink state: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, SinkError>;
