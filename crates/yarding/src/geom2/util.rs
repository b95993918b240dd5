use geo::{Coord, LineString, MultiPolygon, Polygon};
use nalgebra::Vector2;

use super::types::Hs2;

#[inline]
pub fn to_vec2(c: Coord<f64>) -> Vector2<f64> {
    Vector2::new(c.x, c.y)
}

#[inline]
pub fn to_coord(v: Vector2<f64>) -> Coord<f64> {
    Coord { x: v.x, y: v.y }
}

/// Ring vertices without repeats or the closing duplicate.
pub fn ring_points(ring: &LineString<f64>) -> Vec<Vector2<f64>> {
    let mut pts: Vec<_> = ring.0.iter().map(|c| to_vec2(*c)).collect();
    pts.dedup();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    pts
}

/// Shoelace signed area (positive for counterclockwise rings).
pub fn signed_area(ring: &[Vector2<f64>]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for k in 0..ring.len() {
        let p = ring[k];
        let q = ring[(k + 1) % ring.len()];
        acc += p.x * q.y - q.x * p.y;
    }
    0.5 * acc
}

#[inline]
pub fn cross(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Sutherland–Hodgman clip of a ring against convex half-spaces.
///
/// The subject may be concave: degenerate connecting edges carry zero area,
/// so the shoelace area of the output is the exact intersection area.
pub fn clip_ring(ring: &[Vector2<f64>], hs: &[Hs2]) -> Vec<Vector2<f64>> {
    let mut out: Vec<Vector2<f64>> = ring.to_vec();
    for h in hs {
        if out.is_empty() {
            break;
        }
        let input = std::mem::take(&mut out);
        for k in 0..input.len() {
            let p = input[k];
            let q = input[(k + 1) % input.len()];
            let sp = h.slack(p);
            let sq = h.slack(q);
            if sp >= 0.0 {
                out.push(p);
                if sq < 0.0 {
                    out.push(p + (q - p) * (sp / (sp - sq)));
                }
            } else if sq >= 0.0 {
                out.push(p + (q - p) * (sp / (sp - sq)));
            }
        }
    }
    out
}

/// Area of `poly ∩ box(hs)`: exterior part minus hole parts.
pub fn clipped_area(poly: &Polygon<f64>, hs: &[Hs2]) -> f64 {
    let outer = signed_area(&clip_ring(&ring_points(poly.exterior()), hs)).abs();
    let holes: f64 = poly
        .interiors()
        .iter()
        .map(|r| signed_area(&clip_ring(&ring_points(r), hs)).abs())
        .sum();
    (outer - holes).max(0.0)
}

/// Closed-segment intersection test (touching counts).
pub fn segments_touch(
    a0: Vector2<f64>,
    a1: Vector2<f64>,
    b0: Vector2<f64>,
    b1: Vector2<f64>,
) -> bool {
    let d1 = cross(b0, b1, a0);
    let d2 = cross(b0, b1, a1);
    let d3 = cross(a0, a1, b0);
    let d4 = cross(a0, a1, b1);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    let on = |p: Vector2<f64>, q: Vector2<f64>, r: Vector2<f64>| {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1 == 0.0 && on(b0, b1, a0))
        || (d2 == 0.0 && on(b0, b1, a1))
        || (d3 == 0.0 && on(a0, a1, b0))
        || (d4 == 0.0 && on(a0, a1, b1))
}

/// Simple ring: at least three vertices, non-zero area, and no two
/// non-adjacent edges touching.
pub fn ring_is_simple(ring: &[Vector2<f64>]) -> bool {
    let n = ring.len();
    if n < 3 || signed_area(ring) == 0.0 {
        return false;
    }
    for i in 0..n {
        let (a0, a1) = (ring[i], ring[(i + 1) % n]);
        if a0 == a1 {
            return false;
        }
        for j in (i + 2)..n {
            // first and last edges share the closing vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            if segments_touch(a0, a1, ring[j], ring[(j + 1) % n]) {
                return false;
            }
        }
    }
    true
}

/// Every ring of `poly` is simple; shell/hole nesting is not checked.
pub fn polygon_is_valid(poly: &Polygon<f64>) -> bool {
    ring_is_simple(&ring_points(poly.exterior()))
        && poly.interiors().iter().all(|r| ring_is_simple(&ring_points(r)))
}

/// Ring-level validity for every part; does not check nesting or overlap
/// between parts.
pub fn is_valid(geom: &MultiPolygon<f64>) -> bool {
    geom.0.iter().all(polygon_is_valid)
}

#[inline]
pub fn is_empty(geom: &MultiPolygon<f64>) -> bool {
    geom.0.iter().all(|p| p.exterior().0.len() < 4)
}
