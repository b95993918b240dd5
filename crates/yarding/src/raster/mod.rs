//! Cell rasterizer: scene-space polygons → majority-covered grid cells.
//!
//! Purpose
//! - Decide, deterministically, which grid cells belong to an area.
//!
//! Model
//! - A cell belongs to a polygon iff `area(cell ∩ polygon) >= 0.5 · cell_px²`.
//!   The intersection area is computed exactly by clipping each ring against the
//!   cell's four half-spaces (`geom2::util::clipped_area`).
//! - Only cells inside the polygon's bounding box (clamped to the grid) are tested.
//! - Multi-part input: each part is rasterized on its own and the sets are unioned.
//! - Parts with a self-intersecting ring have no cells. Callers repair first.
//!
//! Code cross-refs: `GridConfig`, `Cell`, `crate::transform::Transform`

mod grid;

pub use grid::{Cell, GridAnchor, GridConfig, PagePreset, CELL_PX, DEFAULT_K_VALUE};

use std::collections::BTreeSet;

use geo::{BoundingRect, Intersects, MultiPolygon, Polygon};

use crate::geom2::util::{clipped_area, polygon_is_valid};
use crate::geom2::Hs2;
use crate::transform::Transform;

/// Row-major ordered set of cells.
pub type CellSet = BTreeSet<Cell>;

/// Intersection area of one cell with one polygon (scene units²).
pub fn coverage(grid: &GridConfig, cell: Cell, poly: &Polygon<f64>) -> f64 {
    let r = grid.cell_rect(cell);
    let hs = Hs2::axis_box(r.min().x, r.min().y, r.max().x, r.max().y);
    clipped_area(poly, &hs)
}

fn rasterize_part(grid: &GridConfig, poly: &Polygon<f64>, out: &mut CellSet) {
    let Some(bbox) = poly.bounding_rect() else {
        return;
    };
    let threshold = 0.5 * grid.cell_px * grid.cell_px;
    let (c0, c1) = grid.index_range(bbox.min().x, bbox.max().x, grid.anchor.x, grid.cols);
    let (r0, r1) = grid.index_range(bbox.min().y, bbox.max().y, grid.anchor.y, grid.rows);
    for row in r0..r1 {
        for col in c0..c1 {
            let cell = Cell::new(row, col);
            if coverage(grid, cell, poly) >= threshold {
                out.insert(cell);
            }
        }
    }
}

/// Cells majority-covered by a scene-space geometry. Empty or fully outside
/// input yields an empty set.
pub fn rasterize(grid: &GridConfig, scene: &MultiPolygon<f64>) -> CellSet {
    let mut out = CellSet::new();
    for part in &scene.0 {
        if part.exterior().0.len() < 4 || !polygon_is_valid(part) {
            continue;
        }
        rasterize_part(grid, part, &mut out);
    }
    out
}

/// Rasterize a world-space geometry through `transform`.
pub fn rasterize_world(
    grid: &GridConfig,
    transform: &Transform,
    world: &MultiPolygon<f64>,
) -> CellSet {
    rasterize(grid, &transform.geometry_to_scene(world))
}

/// True when `cell` is part of the rasterized footprint of `world`.
pub fn is_cell_in_area(
    grid: &GridConfig,
    transform: &Transform,
    cell: Cell,
    world: &MultiPolygon<f64>,
) -> bool {
    grid.contains(cell) && rasterize_world(grid, transform, world).contains(&cell)
}

/// True when the world footprint of `cell` touches any ring of `world`.
pub fn is_cell_on_boundary(
    grid: &GridConfig,
    transform: &Transform,
    cell: Cell,
    world: &MultiPolygon<f64>,
) -> bool {
    if !grid.contains(cell) {
        return false;
    }
    let footprint = transform.cell_world_polygon(grid, cell);
    world.0.iter().any(|p| {
        footprint.intersects(p.exterior()) || p.interiors().iter().any(|r| footprint.intersects(r))
    })
}
