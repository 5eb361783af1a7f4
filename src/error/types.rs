use thiserror::Error;

use crate::grid::GridError;
use crate::store::PersistenceError;

/// Unified result type for the crate.
pub type Result<T> = std::result::Result<T, MapError>;

/// Errors surfaced by map construction, mutation and persistence.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("map dimensions {width}x{height} are invalid")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("layer partition violated: {0}")]
    Partition(String),
    #[error("grid error: {0}")]
    Grid(#[from] GridError),
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}
