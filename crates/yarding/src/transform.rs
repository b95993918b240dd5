//! World ↔ scene coordinate transform.
//!
//! Purpose
//! - Map planar survey coordinates (meters, y up) onto the grid's scene space
//!   (scene units, y down) and back.
//!
//! Model
//! - `forward = S ∘ R` where `R` rotates by θ (degrees, counterclockwise) about
//!   the center `c` of the combined bounding box of all loaded geometry, and
//!   `S(p) = diag(s, −s)(p − c) + grid_center + pan` with `s = cell_px / k_value`.
//! - The inverse is the algebraic inverse of the composed `Affine2`, computed once.
//!
//! Code cross-refs: `geom2::Affine2`, `raster::GridConfig`

use geo::{BoundingRect, Coord, MapCoords, MultiPolygon, Polygon, Rect};
use nalgebra::{Matrix2, Vector2};

use crate::geom2::util::{to_coord, to_vec2};
use crate::geom2::Affine2;
use crate::raster::{Cell, GridConfig, PagePreset};

/// Free view parameters: rotation and pan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewParams {
    pub rotation_deg: f64,
    pub pan: Vector2<f64>,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            rotation_deg: 0.0,
            pan: Vector2::zeros(),
        }
    }
}

/// Bidirectional world ↔ scene map for one grid configuration.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    forward: Affine2,
    inverse: Affine2,
}

impl Transform {
    /// `None` when `k_value` is not a positive finite number or the bbox is degenerate
    /// in a way that makes the map non-invertible.
    pub fn new(bbox: Rect<f64>, grid: &GridConfig, k_value: f64, view: ViewParams) -> Option<Self> {
        if !(k_value.is_finite() && k_value > 0.0) {
            return None;
        }
        let c = to_vec2(bbox.center());
        let s = grid.cell_px / k_value;
        let rot = Affine2::rotation_about(view.rotation_deg, c);
        let m = Matrix2::new(s, 0.0, 0.0, -s);
        let place = Affine2 {
            m,
            t: grid.center() + view.pan - m * c,
        };
        let forward = place.compose(&rot);
        let inverse = forward.inverse()?;
        Some(Self { forward, inverse })
    }

    #[inline]
    pub fn world_to_scene(&self, p: Vector2<f64>) -> Vector2<f64> {
        self.forward.apply(p)
    }

    #[inline]
    pub fn scene_to_world(&self, p: Vector2<f64>) -> Vector2<f64> {
        self.inverse.apply(p)
    }

    pub fn geometry_to_scene<G: MapCoords<f64, f64>>(&self, g: &G) -> G::Output {
        g.map_coords(|c: Coord<f64>| to_coord(self.world_to_scene(to_vec2(c))))
    }

    pub fn geometry_to_world<G: MapCoords<f64, f64>>(&self, g: &G) -> G::Output {
        g.map_coords(|c: Coord<f64>| to_coord(self.scene_to_world(to_vec2(c))))
    }

    /// World-space footprint of a grid cell (a rotated square).
    pub fn cell_world_polygon(&self, grid: &GridConfig, cell: Cell) -> Polygon<f64> {
        self.geometry_to_world(&grid.cell_rect(cell).to_polygon())
    }
}

/// Page preset and rotation chosen for a parcel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub page: PagePreset,
    pub rotation_deg: f64,
    /// False when no preset/rotation fits and the fallback was used.
    pub fits: bool,
}

/// Angles tried in order: the two axis-aligned ones first, then 5° steps.
fn candidate_angles() -> impl Iterator<Item = f64> {
    [0.0, 90.0]
        .into_iter()
        .chain((1..18).map(|k| f64::from(k * 5)))
}

/// First rotation (about the bbox center) whose rotated extent fits in
/// `width_m × height_m`.
pub fn find_optimal_rotation(geom: &MultiPolygon<f64>, width_m: f64, height_m: f64) -> Option<f64> {
    let center = to_vec2(geom.bounding_rect()?.center());
    candidate_angles().find(|&deg| {
        let rot = Affine2::rotation_about(deg, center);
        let rotated = geom.map_coords(|c: Coord<f64>| to_coord(rot.apply(to_vec2(c))));
        rotated
            .bounding_rect()
            .map(|r| r.width() <= width_m && r.height() <= height_m)
            .unwrap_or(false)
    })
}

/// Try A4 portrait, then A3 landscape; fall back to A3 at 0° when nothing fits.
pub fn determine_layout(geom: &MultiPolygon<f64>, k_value: f64) -> Layout {
    for page in [PagePreset::A4Portrait, PagePreset::A3Landscape] {
        let (rows, cols) = page.dimensions();
        let (w, h) = (cols as f64 * k_value, rows as f64 * k_value);
        if let Some(deg) = find_optimal_rotation(geom, w, h) {
            tracing::debug!(?page, deg, "layout fits");
            return Layout {
                page,
                rotation_deg: deg,
                fits: true,
            };
        }
    }
    tracing::debug!("no layout fits; falling back to A3 landscape");
    Layout {
        page: PagePreset::A3Landscape,
        rotation_deg: 0.0,
        fits: false,
    }
}
