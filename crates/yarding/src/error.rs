//! Error taxonomy.
//!
//! - `ValidationError`: the geometry or cut lines cannot produce a partition.
//! - `ConfigurationError`: landing cell, mode or `L` are missing or illegal.
//! - An area whose rasterized set is empty is not an error: it has no result
//!   (`Option<AreaResult>::None`).

use thiserror::Error;

use crate::raster::Cell;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("no calculable polygon geometry")]
    EmptyGeometry,
    #[error("polygon geometry is invalid and could not be repaired")]
    InvalidGeometry,
    #[error("no cutting lines were supplied")]
    NoCutLines,
    #[error(
        "the parcel was not split ({found} area(s) produced); cutting lines must cross the parcel completely"
    )]
    DegeneratePartition { found: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("area {area} has no landing cell")]
    MissingLanding { area: usize },
    #[error("landing cell ({}, {}) lies outside the grid", .0.row, .0.col)]
    LandingOutsideGrid(Cell),
    #[error("landing cell ({}, {}) is not inside the area", .0.row, .0.col)]
    LandingNotInArea(Cell),
    #[error("entrance cell ({}, {}) is not on the area boundary", .0.row, .0.col)]
    LandingNotOnBoundary(Cell),
    #[error("unknown calculation mode `{0}`")]
    UnknownCalcMode(String),
    #[error("additional distance must be a finite value >= 0, got {0}")]
    InvalidAdditionalDistance(f64),
    #[error("no area with index {0}")]
    NoSuchArea(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("coordinate transform is not available (no geometry loaded)")]
    TransformUnavailable,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
