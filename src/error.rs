//! Error types for bed planning
//!
//! Structural problems with the input (bad grid sizes, duplicate keys, unknown
//! rule names) surface here. Running out of search budget is not an error and
//! never produces one of these.

use crate::csp::CspError;
use thiserror::Error;

/// Errors raised while building or configuring a planting solver
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("bed '{bed_id}' has invalid grid size {grid_size} (must be > 0)")]
    InvalidGridSize { bed_id: String, grid_size: usize },

    #[error("bed id '{0}' appears more than once")]
    DuplicateBedId(String),

    #[error("plant '{0}' appears more than once in the catalog")]
    DuplicatePlantName(String),

    #[error("plant '{name}' has min_spacing {min_spacing} (must be >= 1)")]
    InvalidMinSpacing { name: String, min_spacing: u32 },

    #[error("plant catalog is empty")]
    EmptyCatalog,

    #[error("cell ({row},{col}) is out of bounds for bed '{bed_id}' of size {grid_size}")]
    CellOutOfBounds {
        bed_id: String,
        row: usize,
        col: usize,
        grid_size: usize,
    },

    #[error("unknown rule '{0}' (expected spacing, antagonist, companion or sunlight)")]
    UnknownRule(String),

    #[error("portfolio solving needs at least one restart")]
    NoRestarts,

    #[error("satisfaction threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),

    #[error(transparent)]
    Csp(#[from] CspError),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
