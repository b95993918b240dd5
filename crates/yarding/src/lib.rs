//! Grid-based average yarding distance.
//!
//! Pipeline: world polygons → `transform` (rotation, scale, pan onto a fixed grid)
//! → `raster` (cells with ≥ 50% coverage) → `distance` (Manhattan-style formula
//! from a landing cell) → `report` (cell-weighted aggregation, audited rounding).
//! `partition` splits a parcel along cutting lines into labeled areas first.
//! `project` ties the stages together around one explicit context value.
//!
//! API Policy
//! - Rendering, file I/O and interaction belong to callers; this crate only
//!   computes and describes results.

pub mod distance;
pub mod error;
pub mod geom2;
pub mod partition;
pub mod project;
pub mod raster;
pub mod report;
pub mod transform;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{ConfigurationError, Error, Result, ValidationError};

/// Common exports for callers driving a full calculation.
pub mod prelude {
    pub use crate::distance::{AreaResult, CalcMode};
    pub use crate::error::{ConfigurationError, Error, ValidationError};
    pub use crate::project::{Area, CalculationRun, Layer, Project, SkipReason};
    pub use crate::raster::{Cell, GridAnchor, GridConfig, PagePreset};
    pub use crate::report::{Report, ReportBlock, Summary};
    pub use crate::transform::{Transform, ViewParams};
    pub use nalgebra::Vector2 as Vec2;
}
