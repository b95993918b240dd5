//! Grid-distance formula for one area.
//!
//! For a rasterized cell set `S` (N = |S|) and landing cell `(r₀, c₀)`:
//! `Pv = Σ_r |r − r₀|·freq(r)`, `Ph = Σ_c |c − c₀|·freq(c)`,
//! `internal = (Pv + Ph) / N · k`, and `final = internal (+ L in external mode)`.
//!
//! The calculator does not check landing legality; see `raster::{is_cell_in_area,
//! is_cell_on_boundary}` and `Project::configure_area`.

use std::str::FromStr;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::raster::{rasterize_world, Cell, CellSet, GridConfig};
use crate::transform::Transform;

/// How the landing point relates to the area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CalcMode {
    /// Landing inside the area.
    #[default]
    Internal,
    /// Landing reached from the area entrance over an extra straight distance `L` (m).
    External { additional_distance: f64 },
}

impl CalcMode {
    #[inline]
    pub fn additional_distance(&self) -> f64 {
        match *self {
            CalcMode::Internal => 0.0,
            CalcMode::External {
                additional_distance,
            } => additional_distance,
        }
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        matches!(self, CalcMode::External { .. })
    }

    /// Parse a mode name, attaching `additional_distance` for `"external"`.
    pub fn parse_with_distance(name: &str, additional_distance: f64) -> Result<Self, ConfigurationError> {
        match CalcModeKind::from_str(name)? {
            CalcModeKind::Internal => Ok(CalcMode::Internal),
            CalcModeKind::External => Ok(CalcMode::External {
                additional_distance,
            }),
        }
    }
}

/// Mode name without its parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalcModeKind {
    Internal,
    External,
}

impl FromStr for CalcModeKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "internal" => Ok(CalcModeKind::Internal),
            "external" => Ok(CalcModeKind::External),
            other => Err(ConfigurationError::UnknownCalcMode(other.to_string())),
        }
    }
}

/// Fully derived result for one area.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaResult {
    pub cells: CellSet,
    /// One entry per grid row.
    pub row_counts: Vec<u64>,
    /// One entry per grid column.
    pub col_counts: Vec<u64>,
    pub product_v: u64,
    pub product_h: u64,
    pub total_cells: u64,
    pub internal_distance: f64,
    pub final_distance: f64,
    pub mode: CalcMode,
    pub landing: Cell,
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

impl AreaResult {
    /// `L` as applied to this result (0 in internal mode).
    #[inline]
    pub fn additional_distance(&self) -> f64 {
        self.mode.additional_distance()
    }
}

/// Distance formula over an already-rasterized cell set. Cells outside `grid`
/// are dropped first; `None` when nothing is left.
pub fn compute_from_cells(
    mut cells: CellSet,
    landing: Cell,
    mode: CalcMode,
    k_value: f64,
    grid: &GridConfig,
) -> Option<AreaResult> {
    cells.retain(|c| grid.contains(*c));
    let total_cells = cells.len() as u64;
    if total_cells == 0 {
        return None;
    }
    let mut row_counts = vec![0u64; grid.rows];
    let mut col_counts = vec![0u64; grid.cols];
    for cell in &cells {
        row_counts[cell.row] += 1;
        col_counts[cell.col] += 1;
    }
    let weighted = |counts: &[u64], origin: usize| -> u64 {
        counts
            .iter()
            .enumerate()
            .map(|(i, &n)| i.abs_diff(origin) as u64 * n)
            .sum()
    };
    let product_v = weighted(&row_counts, landing.row);
    let product_h = weighted(&col_counts, landing.col);
    let internal_distance = (product_v + product_h) as f64 / total_cells as f64 * k_value;
    let final_distance = internal_distance + mode.additional_distance();

    // non-empty: the set has a first and a last element
    let min_row = cells.first().map_or(0, |c| c.row);
    let max_row = cells.last().map_or(0, |c| c.row);
    let min_col = cells.iter().map(|c| c.col).min().unwrap_or(0);
    let max_col = cells.iter().map(|c| c.col).max().unwrap_or(0);

    Some(AreaResult {
        cells,
        row_counts,
        col_counts,
        product_v,
        product_h,
        total_cells,
        internal_distance,
        final_distance,
        mode,
        landing,
        min_row,
        max_row,
        min_col,
        max_col,
    })
}

/// Rasterize `geometry` (world space) and apply the distance formula.
pub fn compute(
    geometry: &MultiPolygon<f64>,
    landing: Cell,
    mode: CalcMode,
    k_value: f64,
    grid: &GridConfig,
    transform: &Transform,
) -> Option<AreaResult> {
    let cells = rasterize_world(grid, transform, geometry);
    compute_from_cells(cells, landing, mode, k_value, grid)
}
