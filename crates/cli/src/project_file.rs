//! JSON project file: planar layers, cut lines and per-area landing settings.

use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use yarding::distance::CalcMode;
use yarding::prelude::Vec2;
use yarding::project::{Layer, Project};
use yarding::raster::{Cell, GridAnchor, DEFAULT_K_VALUE};

type Ring = Vec<[f64; 2]>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    #[serde(default)]
    pub subtitle: String,
    #[serde(default = "default_k_value")]
    pub k_value: f64,
    #[serde(default = "default_anchor")]
    pub anchor: GridAnchor,
    /// Fixed rotation; when absent the layout is chosen automatically.
    #[serde(default)]
    pub rotation_deg: Option<f64>,
    #[serde(default)]
    pub pan: [f64; 2],
    pub layers: Vec<LayerFile>,
    #[serde(default)]
    pub split_lines: Vec<Ring>,
    #[serde(default)]
    pub areas: Vec<AreaFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerFile {
    pub name: String,
    #[serde(default = "yes")]
    pub calc_target: bool,
    /// Each polygon is a list of rings, exterior first.
    pub polygons: Vec<Vec<Ring>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AreaFile {
    pub landing: [usize; 2],
    #[serde(default = "internal")]
    pub mode: String,
    #[serde(default)]
    pub additional_distance: f64,
}

fn default_k_value() -> f64 {
    DEFAULT_K_VALUE
}

fn default_anchor() -> GridAnchor {
    GridAnchor::Screen
}

fn yes() -> bool {
    true
}

fn internal() -> String {
    "internal".to_string()
}

fn line(ring: &[[f64; 2]]) -> LineString<f64> {
    LineString::new(ring.iter().map(|&[x, y]| Coord { x, y }).collect())
}

impl LayerFile {
    pub fn geometry(&self) -> MultiPolygon<f64> {
        self.polygons
            .iter()
            .filter_map(|rings| {
                let (exterior, holes) = rings.split_first()?;
                Some(Polygon::new(line(exterior), holes.iter().map(|h| line(h)).collect()))
            })
            .collect()
    }
}

impl AreaFile {
    pub fn mode(&self) -> Result<CalcMode> {
        Ok(CalcMode::parse_with_distance(&self.mode, self.additional_distance)?)
    }

    pub fn landing(&self) -> Cell {
        Cell::new(self.landing[0], self.landing[1])
    }
}

impl ProjectFile {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn split_lines(&self) -> Vec<LineString<f64>> {
        self.split_lines.iter().map(|l| line(l)).collect()
    }

    /// Project with layers, grid and view applied; areas are not configured yet.
    pub fn to_project(&self) -> Project {
        let mut project = Project::new(self.anchor);
        project.set_k_value(self.k_value);
        for layer in self.layers.iter().rev() {
            project.add_layer(Layer {
                name: layer.name.clone(),
                geometry: layer.geometry(),
                calc_target: layer.calc_target,
            });
        }
        if let Some(deg) = self.rotation_deg {
            project.set_rotation(deg);
        } else if let Some(change) = project.determine_layout() {
            tracing::info!(
                page = ?change.layout.page,
                rotation_deg = change.layout.rotation_deg,
                fits = change.layout.fits,
                "layout"
            );
        }
        project.set_pan(Vec2::new(self.pan[0], self.pan[1]));
        project
    }

    /// Partition when cut lines are present, then apply landing settings in area order.
    pub fn configure(&self, project: &mut Project) -> Result<()> {
        if self.split_lines.is_empty() {
            match self.areas.as_slice() {
                [] => {}
                [single] => project
                    .configure_single(single.mode()?, single.landing())
                    .context("configuring the calculation area")?,
                many => bail!(
                    "{} area settings given but no split lines; expected at most one",
                    many.len()
                ),
            }
            return Ok(());
        }

        for l in self.split_lines() {
            project.add_split_line(l);
        }
        let found = project.prepare_sub_areas()?.len();
        if self.areas.len() != found {
            bail!(
                "partition produced {found} areas but {} area settings were given",
                self.areas.len()
            );
        }
        for (i, area) in self.areas.iter().enumerate() {
            project
                .configure_area(i, area.mode()?, area.landing())
                .with_context(|| format!("configuring area {}", i + 1))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{
        "subtitle": "Parcel 7",
        "pan": [0.0, 12.5],
        "rotation_deg": 0.0,
        "layers": [{
            "name": "parcel",
            "polygons": [[[[5,5],[245,5],[245,245],[5,245],[5,5]]]]
        }],
        "split_lines": [[[125,-10],[125,260]]],
        "areas": [
            {"landing": [22, 12]},
            {"landing": [27, 19], "mode": "external", "additional_distance": 30}
        ]
    }"#;

    #[test]
    fn parses_with_defaults() {
        let file: ProjectFile = serde_json::from_str(SQUARE).unwrap();
        assert_eq!(file.k_value, DEFAULT_K_VALUE);
        assert_eq!(file.anchor, GridAnchor::Screen);
        assert!(file.layers[0].calc_target);
        assert_eq!(file.areas[0].mode().unwrap(), CalcMode::Internal);
        assert_eq!(
            file.areas[1].mode().unwrap(),
            CalcMode::External {
                additional_distance: 30.0
            }
        );
    }

    #[test]
    fn configures_split_areas() {
        let file: ProjectFile = serde_json::from_str(SQUARE).unwrap();
        let mut project = file.to_project();
        file.configure(&mut project).unwrap();
        let names: Vec<_> = project.areas().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(project.areas()[1].landing, Some(Cell::new(27, 19)));
    }

    #[test]
    fn area_count_mismatch_is_an_error() {
        let mut file: ProjectFile = serde_json::from_str(SQUARE).unwrap();
        file.areas.pop();
        let mut project = file.to_project();
        let err = file.configure(&mut project).unwrap_err();
        assert!(err.to_string().contains("2 areas"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let area: AreaFile = serde_json::from_str(r#"{"landing": [0, 0], "mode": "sideways"}"#).unwrap();
        assert!(area.mode().is_err());
    }
}
