//! Grid configuration: cell geometry, presets and scene ↔ cell lookups.

use geo::{coord, Rect};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Scene units per cell side.
pub const CELL_PX: f64 = 25.0;

/// Meters represented by one cell side unless configured otherwise.
pub const DEFAULT_K_VALUE: f64 = 25.0;

/// Grid cell index. Rows grow downward in scene space, columns rightward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Page preset the grid dimensions are derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagePreset {
    A4Portrait,
    A3Landscape,
}

impl PagePreset {
    /// `(rows, cols)` of the grid printed on this page.
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            PagePreset::A4Portrait => (45, 30),
            PagePreset::A3Landscape => (45, 73),
        }
    }
}

/// Where cell (0,0) sits in scene space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridAnchor {
    Screen,
    Print,
}

impl GridAnchor {
    pub fn offset(self) -> Vector2<f64> {
        match self {
            GridAnchor::Screen => Vector2::new(60.0, 40.0),
            GridAnchor::Print => Vector2::new(80.0, 150.0),
        }
    }
}

/// Fixed rows × cols of square cells anchored in scene space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    pub cell_px: f64,
    pub anchor: Vector2<f64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::for_page(PagePreset::A4Portrait, GridAnchor::Screen)
    }
}

impl GridConfig {
    pub fn for_page(page: PagePreset, anchor: GridAnchor) -> Self {
        let (rows, cols) = page.dimensions();
        Self {
            rows,
            cols,
            cell_px: CELL_PX,
            anchor: anchor.offset(),
        }
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Scene-space center of the whole grid.
    pub fn center(&self) -> Vector2<f64> {
        self.anchor
            + Vector2::new(
                self.cols as f64 * self.cell_px / 2.0,
                self.rows as f64 * self.cell_px / 2.0,
            )
    }

    /// Scene-space square of one cell.
    pub fn cell_rect(&self, cell: Cell) -> Rect<f64> {
        let x0 = self.anchor.x + cell.col as f64 * self.cell_px;
        let y0 = self.anchor.y + cell.row as f64 * self.cell_px;
        Rect::new(
            coord! { x: x0, y: y0 },
            coord! { x: x0 + self.cell_px, y: y0 + self.cell_px },
        )
    }

    /// Cell under a scene point, `None` outside the grid.
    pub fn cell_at(&self, p: Vector2<f64>) -> Option<Cell> {
        let fx = (p.x - self.anchor.x) / self.cell_px;
        let fy = (p.y - self.anchor.y) / self.cell_px;
        if !(fx.is_finite() && fy.is_finite()) || fx < 0.0 || fy < 0.0 {
            return None;
        }
        let cell = Cell::new(fy.floor() as usize, fx.floor() as usize);
        self.contains(cell).then_some(cell)
    }

    /// Half-open index range `[start, end)` of cells overlapping `[lo, hi]`
    /// along one axis, clamped to `0..len`.
    pub(crate) fn index_range(&self, lo: f64, hi: f64, origin: f64, len: usize) -> (usize, usize) {
        let start = ((lo - origin) / self.cell_px).floor().max(0.0);
        let end = ((hi - origin) / self.cell_px).floor() + 1.0;
        let end = end.min(len as f64);
        if !(start.is_finite() && end.is_finite()) || end <= start {
            return (0, 0);
        }
        (start as usize, end as usize)
    }
}
