use thiserror::Error;

use crate::actions::ActionError;
use crate::core::types::RegionId;
use crate::geometry::GeometryError;

#[derive(Error, Debug)]
pub enum TerritoryError {
    #[error("Region not found: {0}")]
    RegionNotFound(RegionId),

    #[error("Tile not found: {0}")]
    TileNotFound(String),

    #[error("Invalid tile {id}: {reason}")]
    InvalidTile { id: String, reason: String },

    #[error("Region already exists: {0}")]
    DuplicateRegion(RegionId),

    #[error("Invalid region {id}: {reason}")]
    InvalidRegion { id: RegionId, reason: String },

    #[error("Degenerate geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Action rejected: {0}")]
    Action(#[from] ActionError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, TerritoryError>;
