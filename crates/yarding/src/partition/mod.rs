//! Area partitioner: split a parcel into ordered, named sub-areas along cut lines.
//!
//! Purpose
//! - Turn user-drawn polylines into a deterministic list of sub-areas
//!   (`A`, `B`, `C`, … ordered north → south, then west → east).
//!
//! Model
//! 1. Validate the parcel; repair self-intersections by an overlay union with
//!    the empty set (zero-width buffer equivalent).
//! 2. Node cut lines together with the parcel boundary into one line network.
//! 3. Polygonize, keep faces whose interior point lies in the parcel.
//! 4. Order by descending centroid Y, ascending centroid X; label.
//!
//! Failures are `ValidationError`s; nothing is returned partially.
//!
//! Code cross-refs: `network::LineNetwork`, `crate::project::Area`

mod network;

use geo::{BooleanOps, Centroid, Contains, InteriorPoint, LineString, MultiPolygon, Polygon};
use nalgebra::Vector2;

use crate::error::ValidationError;
use crate::geom2::util::{is_empty, is_valid, to_vec2};
use crate::geom2::GeomCfg;
use crate::project::Area;

use network::{LineNetwork, Segment};

/// Spreadsheet-style labels: A … Z, AA, AB, …
pub fn area_label(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Overlay union with nothing: resolves self-intersections into valid rings.
pub fn repair(geom: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    geom.union(&MultiPolygon::new(vec![]))
}

/// Non-empty, valid parcel. Invalid rings are repaired; multi-part input is
/// always re-unioned, since ring checks cannot see parts overlapping.
pub fn validated_parcel(geom: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>, ValidationError> {
    if is_empty(geom) {
        return Err(ValidationError::EmptyGeometry);
    }
    if geom.0.len() == 1 && is_valid(geom) {
        return Ok(geom.clone());
    }
    let repaired = repair(geom);
    if is_empty(&repaired) || !is_valid(&repaired) {
        return Err(ValidationError::InvalidGeometry);
    }
    tracing::debug!(parts = repaired.0.len(), "repaired parcel geometry");
    Ok(repaired)
}

fn ring_segments(ring: &LineString<f64>, out: &mut Vec<Segment>) {
    out.extend(ring.0.windows(2).map(|w| (to_vec2(w[0]), to_vec2(w[1]))));
}

/// Split `parcel` along `lines` (world coordinates).
pub fn partition(parcel: &MultiPolygon<f64>, lines: &[LineString<f64>]) -> Result<Vec<Area>, ValidationError> {
    partition_with(parcel, lines, &GeomCfg::default())
}

pub fn partition_with(
    parcel: &MultiPolygon<f64>,
    lines: &[LineString<f64>],
    cfg: &GeomCfg,
) -> Result<Vec<Area>, ValidationError> {
    let parcel = validated_parcel(parcel)?;
    let lines: Vec<&LineString<f64>> = lines.iter().filter(|l| l.0.len() >= 2).collect();
    if lines.is_empty() {
        return Err(ValidationError::NoCutLines);
    }

    let mut segments = Vec::new();
    for line in &lines {
        ring_segments(line, &mut segments);
    }
    for part in &parcel.0 {
        ring_segments(part.exterior(), &mut segments);
        for hole in part.interiors() {
            ring_segments(hole, &mut segments);
        }
    }
    let mut network = LineNetwork::build(&segments, cfg);
    network.prune_dangles();
    tracing::debug!(
        lines = lines.len(),
        nodes = network.nodes.len(),
        edges = network.edges.len(),
        "noded cut network"
    );

    let candidates = network.polygons(cfg);
    let found = candidates.len();
    let mut pieces: Vec<(Vector2<f64>, Polygon<f64>)> = candidates
        .into_iter()
        .filter(|p| {
            p.interior_point()
                .map(|pt| parcel.contains(&pt))
                .unwrap_or(false)
        })
        .filter_map(|p| p.centroid().map(|c| (Vector2::new(c.x(), c.y()), p)))
        .collect();
    tracing::debug!(faces = found, kept = pieces.len(), "filtered faces inside parcel");

    if pieces.len() < 2 {
        return Err(ValidationError::DegeneratePartition { found: pieces.len() });
    }
    let centroids: Vec<Vector2<f64>> = pieces.iter().map(|(c, _)| *c).collect();
    let mut slots: Vec<Option<Polygon<f64>>> = pieces.into_iter().map(|(_, p)| Some(p)).collect();
    Ok(reading_order(&centroids, cfg.eps_node)
        .into_iter()
        .filter_map(|i| slots[i].take())
        .enumerate()
        .map(|(i, poly)| Area::new(i + 1, area_label(i), poly.into()))
        .collect())
}

/// Indices of `centroids` north → south, then west → east.
///
/// Centroids are grouped into rows first: after sorting by descending Y, a
/// centroid within `eps` of the previous one joins its row. Rows are then
/// read west → east. Keeping the grouping separate from the sort keeps the
/// comparator a total order.
fn reading_order(centroids: &[Vector2<f64>], eps: f64) -> Vec<usize> {
    let mut by_y: Vec<usize> = (0..centroids.len()).collect();
    by_y.sort_by(|&a, &b| centroids[b].y.total_cmp(&centroids[a].y));

    let mut row_of = vec![0usize; centroids.len()];
    let mut row = 0;
    for w in by_y.windows(2) {
        if (centroids[w[0]].y - centroids[w[1]].y).abs() > eps {
            row += 1;
        }
        row_of[w[1]] = row;
    }

    let mut order = by_y;
    order.sort_by(|&a, &b| {
        row_of[a]
            .cmp(&row_of[b])
            .then(centroids[a].x.total_cmp(&centroids[b].x))
    });
    order
}

#[cfg(test)]
mod tests;
