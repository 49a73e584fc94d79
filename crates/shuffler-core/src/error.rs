//! Error types for the resequencing engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShufflerError {
    #[error("Degenerate range: every value equals {0}, cannot rescale")]
    DegenerateRange(usize),
    #[error("Cannot choose from an empty pool")]
    EmptyPool,
    #[error("Invalid event counts {0:?}: expected a non-empty list of positive run lengths")]
    InvalidEventCounts(Vec<usize>),
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("Unknown selection mode: {0}")]
    UnknownSelectionMode(String),
}

pub type Result<T> = std::result::Result<T, ShufflerError>;
