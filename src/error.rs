use thiserror::Error;

use crate::grid::Occupant;
use crate::types::Position;

/// Problems with simulation parameters, detected before any tick runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid dimensions must be positive with at most {max_cells} cells, got {width}x{height}", max_cells = crate::grid::MAX_CELLS)]
    InvalidDimensions { width: usize, height: usize },

    #[error("city position {city} lies outside the {width}x{height} grid")]
    CityOutOfBounds {
        city: Position,
        width: usize,
        height: usize,
    },

    #[error("population {population} exceeds the placement limit of {limit} for {cells} cells")]
    TooDense {
        population: usize,
        limit: usize,
        cells: usize,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("no empty cell found for agent {agent} after {attempts} attempts")]
    UnsatisfiablePlacement { agent: usize, attempts: usize },

    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

/// Grid registration faults. These indicate a bug in movement candidate
/// generation rather than a user error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("position {pos} is outside the {width}x{height} grid")]
    OutOfBounds {
        pos: Position,
        width: usize,
        height: usize,
    },

    #[error("{0:?} is not registered on the grid")]
    NotPlaced(Occupant),

    #[error("agent cannot be placed on the city cell {pos}")]
    CityCell { pos: Position },
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("placement error: {0}")]
    Placement(#[from] PlacementError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
