//! Project context: everything a calculation needs, passed explicitly.
//!
//! Purpose
//! - Own the loaded layers, grid/view parameters, cut lines and areas for one
//!   parcel, and run the pipeline (transform → rasterize → distance → aggregate)
//!   over them.
//!
//! Invariants
//! - Results are derived data: any change to geometry, grid, view or landing
//!   configuration drops every stored result.
//! - A landing names a grid cell, so it is only meaningful for the grid
//!   placement it was chosen under. Grid and view changes forget every
//!   landing; layer changes forget all calculation settings.
//! - A run re-checks each landing against the current placement and skips
//!   the area when the check fails.
//! - `prepare_sub_areas` replaces the area list completely or not at all.
//! - A calculation run assigns all results at once; an area that cannot be
//!   computed is reported in `CalculationRun::skipped` and has no result.
//!
//! Code cross-refs: `Transform`, `raster`, `distance`, `partition`, `report`

use geo::{BooleanOps, BoundingRect, LineString, MultiPolygon, Rect};
use nalgebra::Vector2;

use crate::distance::{self, AreaResult, CalcMode};
use crate::error::{ConfigurationError, Error, Result, ValidationError};
use crate::geom2::util::is_valid;
use crate::partition::{self, repair};
use crate::raster::{
    is_cell_in_area, is_cell_on_boundary, rasterize_world, Cell, GridAnchor, GridConfig, PagePreset,
    DEFAULT_K_VALUE,
};
use crate::report::{self, Report, Summary};
use crate::transform::{determine_layout, Layout, Transform, ViewParams};

/// Upper bound accepted for the additional distance `L` (m).
pub const MAX_ADDITIONAL_DISTANCE: f64 = 99_999.0;

/// Name of the area used when the parcel is not split.
pub const SINGLE_AREA_NAME: &str = "Calculation area";

/// One vector layer supplied by the host.
#[derive(Clone, Debug)]
pub struct Layer {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    /// Whether the layer's polygons form the calculated parcel.
    pub calc_target: bool,
}

/// One computable unit: the whole parcel or one sub-polygon.
#[derive(Clone, Debug)]
pub struct Area {
    pub id: usize,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    pub mode: CalcMode,
    pub landing: Option<Cell>,
    pub result: Option<AreaResult>,
}

impl Area {
    pub fn new(id: usize, name: String, geometry: MultiPolygon<f64>) -> Self {
        Self {
            id,
            name,
            geometry,
            mode: CalcMode::Internal,
            landing: None,
            result: None,
        }
    }
}

/// Why an area produced no result in a run.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// The rasterized footprint is empty.
    NoCells,
    Configuration(ConfigurationError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkippedArea {
    pub id: usize,
    pub reason: SkipReason,
}

/// Outcome of `Project::run_calculation`.
#[derive(Clone, Debug)]
pub struct CalculationRun {
    /// Operational weighted average; `None` when no area produced cells.
    pub summary: Option<Summary>,
    pub skipped: Vec<SkippedArea>,
}

/// Result of `Project::determine_layout`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutChange {
    pub layout: Layout,
    pub changed: bool,
}

/// Cell count and hectares of a rasterized footprint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    pub cells: usize,
    pub hectares: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct AreaSettings {
    mode: CalcMode,
    landing: Option<Cell>,
}

#[derive(Clone, Debug)]
pub struct Project {
    k_value: f64,
    page: PagePreset,
    anchor: GridAnchor,
    view: ViewParams,
    layers: Vec<Layer>,
    master_bbox: Option<Rect<f64>>,
    split_lines: Vec<LineString<f64>>,
    split_mode: bool,
    areas: Vec<Area>,
    single: AreaSettings,
}

impl Default for Project {
    fn default() -> Self {
        Self::new(GridAnchor::Screen)
    }
}

impl Project {
    pub fn new(anchor: GridAnchor) -> Self {
        Self {
            k_value: DEFAULT_K_VALUE,
            page: PagePreset::A4Portrait,
            anchor,
            view: ViewParams::default(),
            layers: Vec::new(),
            master_bbox: None,
            split_lines: Vec::new(),
            split_mode: false,
            areas: Vec::new(),
            single: AreaSettings::default(),
        }
    }

    // ---- grid and view -------------------------------------------------

    #[inline]
    pub fn k_value(&self) -> f64 {
        self.k_value
    }

    pub fn set_k_value(&mut self, k_value: f64) {
        self.k_value = k_value;
        self.grid_moved();
    }

    pub fn grid(&self) -> GridConfig {
        GridConfig::for_page(self.page, self.anchor)
    }

    #[inline]
    pub fn page(&self) -> PagePreset {
        self.page
    }

    pub fn set_page(&mut self, page: PagePreset) {
        self.page = page;
        self.grid_moved();
    }

    #[inline]
    pub fn view(&self) -> ViewParams {
        self.view
    }

    pub fn set_rotation(&mut self, deg: f64) {
        self.view.rotation_deg = deg;
        self.grid_moved();
    }

    pub fn set_pan(&mut self, pan: Vector2<f64>) {
        self.view.pan = pan;
        self.grid_moved();
    }

    /// `None` until some layer establishes a bounding box.
    pub fn transform(&self) -> Option<Transform> {
        Transform::new(self.master_bbox?, &self.grid(), self.k_value, self.view)
    }

    // ---- layers --------------------------------------------------------

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// New layers go on top.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.insert(0, layer);
        self.geometry_changed();
    }

    pub fn remove_layer(&mut self, index: usize) -> Option<Layer> {
        if index >= self.layers.len() {
            return None;
        }
        let layer = self.layers.remove(index);
        self.geometry_changed();
        Some(layer)
    }

    pub fn set_calc_target(&mut self, index: usize, calc_target: bool) {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.calc_target = calc_target;
            self.reset_calculation_settings();
        }
    }

    #[inline]
    pub fn master_bbox(&self) -> Option<Rect<f64>> {
        self.master_bbox
    }

    fn geometry_changed(&mut self) {
        self.master_bbox = self.all_layers_geometry().and_then(|g| g.bounding_rect());
        self.reset_calculation_settings();
    }

    /// Cells no longer sit where the landings were picked.
    fn grid_moved(&mut self) {
        self.single.landing = None;
        for area in &mut self.areas {
            area.landing = None;
            area.result = None;
        }
    }

    fn union_of<'a>(layers: impl Iterator<Item = &'a Layer>) -> Option<MultiPolygon<f64>> {
        let mut acc: Option<MultiPolygon<f64>> = None;
        for layer in layers {
            for poly in &layer.geometry.0 {
                let mut part = MultiPolygon::new(vec![poly.clone()]);
                if !is_valid(&part) {
                    part = repair(&part);
                }
                if part.0.is_empty() {
                    continue;
                }
                acc = Some(match acc {
                    None => part,
                    Some(a) => a.union(&part),
                });
            }
        }
        acc.filter(|g| !g.0.is_empty())
    }

    /// Union of all calc-target layers (invalid parts repaired first).
    pub fn combined_calculable_geometry(&self) -> Option<MultiPolygon<f64>> {
        Self::union_of(self.layers.iter().filter(|l| l.calc_target))
    }

    pub fn all_layers_geometry(&self) -> Option<MultiPolygon<f64>> {
        Self::union_of(self.layers.iter())
    }

    /// Pick page preset and rotation for the loaded geometry.
    pub fn determine_layout(&mut self) -> Option<LayoutChange> {
        let geom = self.all_layers_geometry()?;
        let layout = determine_layout(&geom, self.k_value);
        let changed = layout.page != self.page || layout.rotation_deg != self.view.rotation_deg;
        if changed {
            self.page = layout.page;
            self.view.rotation_deg = layout.rotation_deg;
            self.grid_moved();
        }
        Some(LayoutChange { layout, changed })
    }

    /// Cells and hectares of the calculable parcel as it sits on the grid.
    pub fn footprint(&self, geometry: &MultiPolygon<f64>) -> Option<Footprint> {
        let t = self.transform()?;
        let cells = rasterize_world(&self.grid(), &t, geometry).len();
        Some(Footprint {
            cells,
            hectares: cells as f64 * self.k_value * self.k_value / 10_000.0,
        })
    }

    // ---- split workflow ------------------------------------------------

    pub fn split_lines(&self) -> &[LineString<f64>] {
        &self.split_lines
    }

    pub fn add_split_line(&mut self, line: LineString<f64>) {
        self.split_lines.push(line);
    }

    pub fn clear_split_lines(&mut self) {
        self.split_lines.clear();
    }

    #[inline]
    pub fn is_split_mode(&self) -> bool {
        self.split_mode
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Partition the calculable parcel along the current split lines.
    /// On failure the previous area list is left untouched.
    pub fn prepare_sub_areas(&mut self) -> Result<&[Area]> {
        let parcel = self
            .combined_calculable_geometry()
            .ok_or(ValidationError::EmptyGeometry)?;
        let areas = partition::partition(&parcel, &self.split_lines)?;
        tracing::debug!(areas = areas.len(), "prepared sub-areas");
        self.areas = areas;
        self.split_mode = true;
        Ok(&self.areas)
    }

    /// Leave the split workflow; the whole parcel is one area again.
    pub fn use_single_area(&mut self) {
        self.split_mode = false;
        self.areas.clear();
    }

    // ---- landing configuration ----------------------------------------

    fn landing_problem(
        &self,
        geometry: &MultiPolygon<f64>,
        mode: CalcMode,
        landing: Cell,
        t: &Transform,
    ) -> Option<ConfigurationError> {
        let l = mode.additional_distance();
        if !(l.is_finite() && (0.0..=MAX_ADDITIONAL_DISTANCE).contains(&l)) {
            return Some(ConfigurationError::InvalidAdditionalDistance(l));
        }
        let grid = self.grid();
        if !grid.contains(landing) {
            return Some(ConfigurationError::LandingOutsideGrid(landing));
        }
        match mode {
            CalcMode::Internal if !is_cell_in_area(&grid, t, landing, geometry) => {
                Some(ConfigurationError::LandingNotInArea(landing))
            }
            CalcMode::External { .. } if !is_cell_on_boundary(&grid, t, landing, geometry) => {
                Some(ConfigurationError::LandingNotOnBoundary(landing))
            }
            _ => None,
        }
    }

    fn check_landing(
        &self,
        geometry: &MultiPolygon<f64>,
        mode: CalcMode,
        landing: Cell,
    ) -> Result<()> {
        let t = self.transform().ok_or(Error::TransformUnavailable)?;
        match self.landing_problem(geometry, mode, landing, &t) {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Set mode and landing for the single-area workflow.
    pub fn configure_single(&mut self, mode: CalcMode, landing: Cell) -> Result<()> {
        let parcel = self
            .combined_calculable_geometry()
            .ok_or(ValidationError::EmptyGeometry)?;
        self.check_landing(&parcel, mode, landing)?;
        self.single = AreaSettings {
            mode,
            landing: Some(landing),
        };
        self.invalidate_results();
        Ok(())
    }

    /// Set mode and landing for sub-area `index`.
    pub fn configure_area(&mut self, index: usize, mode: CalcMode, landing: Cell) -> Result<()> {
        let area = self
            .areas
            .get(index)
            .ok_or(ConfigurationError::NoSuchArea(index))?;
        self.check_landing(&area.geometry, mode, landing)?;
        let area = &mut self.areas[index];
        area.mode = mode;
        area.landing = Some(landing);
        self.invalidate_results();
        Ok(())
    }

    /// Forget landings, modes, split lines, areas and results.
    pub fn reset_calculation_settings(&mut self) {
        self.split_mode = false;
        self.split_lines.clear();
        self.areas.clear();
        self.single = AreaSettings::default();
    }

    fn invalidate_results(&mut self) {
        for area in &mut self.areas {
            area.result = None;
        }
    }

    // ---- calculation ---------------------------------------------------

    fn compute_area(&self, area: &Area, t: &Transform) -> Result<AreaResult, SkipReason> {
        let landing = area.landing.ok_or(SkipReason::Configuration(
            ConfigurationError::MissingLanding { area: area.id },
        ))?;
        if let Some(e) = self.landing_problem(&area.geometry, area.mode, landing, t) {
            return Err(SkipReason::Configuration(e));
        }
        distance::compute(&area.geometry, landing, area.mode, self.k_value, &self.grid(), t)
            .ok_or(SkipReason::NoCells)
    }

    /// Recompute every area and the operational summary.
    pub fn run_calculation(&mut self) -> Result<CalculationRun> {
        let t = self.transform().ok_or(Error::TransformUnavailable)?;
        if !self.split_mode {
            let parcel = self
                .combined_calculable_geometry()
                .ok_or(ValidationError::EmptyGeometry)?;
            let mut area = Area::new(1, SINGLE_AREA_NAME.to_string(), parcel);
            area.mode = self.single.mode;
            area.landing = self.single.landing;
            self.areas = vec![area];
        }

        let mut skipped = Vec::new();
        let results: Vec<Option<AreaResult>> = self
            .areas
            .iter()
            .map(|area| match self.compute_area(area, &t) {
                Ok(res) => Some(res),
                Err(reason) => {
                    tracing::debug!(area = area.id, ?reason, "area skipped");
                    skipped.push(SkippedArea {
                        id: area.id,
                        reason,
                    });
                    None
                }
            })
            .collect();
        for (area, result) in self.areas.iter_mut().zip(results) {
            area.result = result;
        }
        let summary = report::summarize(self.areas.iter().filter_map(|a| a.result.as_ref()));
        Ok(CalculationRun { summary, skipped })
    }

    /// Report blocks for the current results.
    pub fn report(&self, subtitle: &str) -> Report {
        report::build_report(subtitle, &self.areas, self.k_value)
    }
}
