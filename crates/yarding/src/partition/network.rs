//! Planar line network: noding, dangle pruning and face tracing.
//!
//! Model
//! - Segments are split at every mutual intersection (including touching
//!   endpoints and collinear overlaps); endpoints closer than `eps_node` are one node.
//! - Edges hanging off the network (degree-1 chains) are removed repeatedly.
//! - Faces are traced with the "next clockwise from the twin" rule, which walks
//!   every face with its interior on the left: bounded faces come out
//!   counterclockwise (positive area), the outer boundary of each connected
//!   component comes out clockwise (negative area).
//! - Negative rings are attached as holes to the smallest positive face that
//!   strictly contains them, so islands of cut lines carve holes like in a
//!   regular polygonizer.

use std::collections::{BTreeSet, HashMap, VecDeque};

use geo::{Area, Contains, Coord, LineString, Point, Polygon};
use nalgebra::Vector2;

use crate::geom2::util::{signed_area, to_coord};
use crate::geom2::GeomCfg;

pub(crate) type Segment = (Vector2<f64>, Vector2<f64>);

#[inline]
fn cross2(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Parameter of `p` projected on `a0 + t (a1 - a0)`, if `p` lies on the segment.
fn param_on(a: &Segment, p: Vector2<f64>, cfg: &GeomCfg) -> Option<f64> {
    let r = a.1 - a.0;
    let len2 = r.norm_squared();
    if len2 == 0.0 {
        return None;
    }
    let t = (p - a.0).dot(&r) / len2;
    if t < -cfg.eps_param || t > 1.0 + cfg.eps_param {
        return None;
    }
    let t = t.clamp(0.0, 1.0);
    ((a.0 + r * t - p).norm() <= cfg.eps_node).then_some(t)
}

/// Split parameters contributed by the pair `(a, b)`.
fn intersect(a: &Segment, b: &Segment, cfg: &GeomCfg) -> (Vec<f64>, Vec<f64>) {
    let r = a.1 - a.0;
    let s = b.1 - b.0;
    let denom = cross2(r, s);
    let scale = r.norm() * s.norm();
    let (mut ta, mut tb) = (Vec::new(), Vec::new());
    if denom.abs() > cfg.eps_param * scale {
        let qp = b.0 - a.0;
        let t = cross2(qp, s) / denom;
        let u = cross2(qp, r) / denom;
        let lo = -cfg.eps_param;
        let hi = 1.0 + cfg.eps_param;
        if (lo..=hi).contains(&t) && (lo..=hi).contains(&u) {
            ta.push(t.clamp(0.0, 1.0));
            tb.push(u.clamp(0.0, 1.0));
        }
        return (ta, tb);
    }
    // parallel: only endpoints lying on the other segment matter
    ta.extend([b.0, b.1].into_iter().filter_map(|p| param_on(a, p, cfg)));
    tb.extend([a.0, a.1].into_iter().filter_map(|p| param_on(b, p, cfg)));
    (ta, tb)
}

fn bbox_overlap(a: &Segment, b: &Segment, eps: f64) -> bool {
    a.0.x.min(a.1.x) <= b.0.x.max(b.1.x) + eps
        && b.0.x.min(b.1.x) <= a.0.x.max(a.1.x) + eps
        && a.0.y.min(a.1.y) <= b.0.y.max(b.1.y) + eps
        && b.0.y.min(b.1.y) <= a.0.y.max(a.1.y) + eps
}

/// Snapping node index over buckets of side `eps_node`.
struct NodeIndex {
    eps: f64,
    nodes: Vec<Vector2<f64>>,
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl NodeIndex {
    fn new(eps: f64) -> Self {
        Self {
            eps,
            nodes: Vec::new(),
            buckets: HashMap::new(),
        }
    }

    fn key(&self, p: Vector2<f64>) -> (i64, i64) {
        ((p.x / self.eps).floor() as i64, (p.y / self.eps).floor() as i64)
    }

    fn id(&mut self, p: Vector2<f64>) -> usize {
        let (kx, ky) = self.key(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(ids) = self.buckets.get(&(kx + dx, ky + dy)) {
                    if let Some(&id) = ids.iter().find(|&&id| (self.nodes[id] - p).norm() <= self.eps) {
                        return id;
                    }
                }
            }
        }
        let id = self.nodes.len();
        self.nodes.push(p);
        self.buckets.entry((kx, ky)).or_default().push(id);
        id
    }
}

/// Noded, undirected planar graph.
#[derive(Debug)]
pub(crate) struct LineNetwork {
    pub nodes: Vec<Vector2<f64>>,
    pub edges: Vec<(usize, usize)>,
}

impl LineNetwork {
    /// Node all segments against each other and deduplicate edges.
    pub fn build(segments: &[Segment], cfg: &GeomCfg) -> Self {
        let segs: Vec<Segment> = segments
            .iter()
            .copied()
            .filter(|s| (s.1 - s.0).norm() > cfg.eps_node)
            .collect();
        let mut cuts: Vec<Vec<f64>> = vec![vec![0.0, 1.0]; segs.len()];
        for i in 0..segs.len() {
            for j in (i + 1)..segs.len() {
                if !bbox_overlap(&segs[i], &segs[j], cfg.eps_node) {
                    continue;
                }
                let (ti, tj) = intersect(&segs[i], &segs[j], cfg);
                cuts[i].extend(ti);
                cuts[j].extend(tj);
            }
        }
        let mut index = NodeIndex::new(cfg.eps_node);
        let mut edges = BTreeSet::new();
        for (seg, ts) in segs.iter().zip(cuts.iter_mut()) {
            ts.sort_by(f64::total_cmp);
            let ids: Vec<usize> = ts
                .iter()
                .map(|&t| index.id(seg.0 + (seg.1 - seg.0) * t))
                .collect();
            for w in ids.windows(2) {
                if w[0] != w[1] {
                    edges.insert((w[0].min(w[1]), w[0].max(w[1])));
                }
            }
        }
        Self {
            nodes: index.nodes,
            edges: edges.into_iter().collect(),
        }
    }

    /// Remove degree-1 chains until every remaining node has degree ≥ 2.
    pub fn prune_dangles(&mut self) {
        let mut incident: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (e, &(u, v)) in self.edges.iter().enumerate() {
            incident[u].push(e);
            incident[v].push(e);
        }
        let mut alive = vec![true; self.edges.len()];
        let mut degree: Vec<usize> = incident.iter().map(Vec::len).collect();
        let mut queue: VecDeque<usize> = (0..self.nodes.len()).filter(|&n| degree[n] == 1).collect();
        while let Some(n) = queue.pop_front() {
            if degree[n] != 1 {
                continue;
            }
            let Some(&e) = incident[n].iter().find(|&&e| alive[e]) else {
                continue;
            };
            alive[e] = false;
            let (u, v) = self.edges[e];
            let other = if u == n { v } else { u };
            degree[n] -= 1;
            degree[other] -= 1;
            if degree[other] == 1 {
                queue.push_back(other);
            }
        }
        let mut k = 0;
        self.edges.retain(|_| {
            k += 1;
            alive[k - 1]
        });
    }

    /// Closed rings of every face; bounded faces are counterclockwise.
    fn face_rings(&self) -> Vec<Vec<usize>> {
        // half-edge h: 2e is u→v, 2e+1 is v→u
        let origin = |h: usize| {
            let (u, v) = self.edges[h / 2];
            if h % 2 == 0 {
                u
            } else {
                v
            }
        };
        let target = |h: usize| origin(h ^ 1);
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for h in 0..2 * self.edges.len() {
            outgoing[origin(h)].push(h);
        }
        let angle = |h: usize| {
            let d = self.nodes[target(h)] - self.nodes[origin(h)];
            d.y.atan2(d.x)
        };
        for out in &mut outgoing {
            out.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
        }
        let mut position = vec![0usize; 2 * self.edges.len()];
        for out in &outgoing {
            for (i, &h) in out.iter().enumerate() {
                position[h] = i;
            }
        }
        let next = |h: usize| {
            let twin = h ^ 1;
            let out = &outgoing[origin(twin)];
            out[(position[twin] + out.len() - 1) % out.len()]
        };

        let mut visited = vec![false; 2 * self.edges.len()];
        let mut rings = Vec::new();
        for start in 0..visited.len() {
            if visited[start] {
                continue;
            }
            let mut ring = Vec::new();
            let mut h = start;
            while !visited[h] {
                visited[h] = true;
                ring.push(origin(h));
                h = next(h);
            }
            rings.push(ring);
        }
        rings
    }

    /// Polygonize the network: bounded faces with their holes.
    pub fn polygons(&self, cfg: &GeomCfg) -> Vec<Polygon<f64>> {
        let mut shells: Vec<(f64, Polygon<f64>)> = Vec::new();
        let mut holes: Vec<LineString<f64>> = Vec::new();
        for ring in self.face_rings() {
            let pts: Vec<Vector2<f64>> = ring.iter().map(|&n| self.nodes[n]).collect();
            let area = signed_area(&pts);
            let ls: LineString<f64> = pts.iter().map(|&p| to_coord(p)).collect::<Vec<Coord<f64>>>().into();
            if area > cfg.eps_area {
                shells.push((area, Polygon::new(ls, vec![])));
            } else if area < -cfg.eps_area {
                holes.push(ls);
            }
        }
        for hole in holes {
            let Some(pt) = hole.0.first().copied().map(Point::from) else {
                continue;
            };
            let owner = shells
                .iter_mut()
                .filter(|(_, shell)| shell.contains(&pt))
                .min_by(|a, b| a.0.total_cmp(&b.0));
            if let Some((area, shell)) = owner {
                *area -= Polygon::new(hole.clone(), vec![]).unsigned_area();
                shell.interiors_push(hole);
            }
        }
        tracing::trace!(faces = shells.len(), "polygonized line network");
        shells.into_iter().map(|(_, p)| p).collect()
    }
}
