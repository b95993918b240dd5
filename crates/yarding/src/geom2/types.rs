//! Basic 2D types and tolerances shared by the transform, rasterizer and partitioner.
//!
//! - `GeomCfg`: centralizes epsilons for node snapping, segment parameters and areas.
//! - `Hs2`: closed half‑space `n·x <= c`, used to clip rings against cell squares.
//! - `Affine2`: 2D affine map `x ↦ M x + t` (world ↔ scene).
//!
//! Code cross-refs: `util::clip_ring`, `crate::transform::Transform`

use nalgebra::{Matrix2, Vector2};

/// Geometry configuration (tolerances).
#[derive(Clone, Copy, Debug)]
pub struct GeomCfg {
    /// Two network nodes closer than this (world units) are the same node.
    pub eps_node: f64,
    /// Slack on segment parameters when deciding whether two segments meet.
    pub eps_param: f64,
    /// Faces or pieces with less absolute area than this are discarded.
    pub eps_area: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self {
            eps_node: 1e-7,
            eps_param: 1e-9,
            eps_area: 1e-9,
        }
    }
}

/// Closed half‑space `n · x <= c` (no normalization required here).
#[derive(Clone, Copy, Debug)]
pub struct Hs2 {
    pub n: Vector2<f64>,
    pub c: f64,
}

impl Hs2 {
    #[inline]
    pub fn new(n: Vector2<f64>, c: f64) -> Self {
        Self { n, c }
    }
    /// Signed slack `c - n·p`; non-negative inside.
    #[inline]
    pub fn slack(&self, p: Vector2<f64>) -> f64 {
        self.c - self.n.dot(&p)
    }
    /// Axis-aligned box `[x0,x1] × [y0,y1]` as four half-spaces.
    pub fn axis_box(x0: f64, y0: f64, x1: f64, y1: f64) -> [Hs2; 4] {
        [
            Hs2::new(Vector2::new(1.0, 0.0), x1),
            Hs2::new(Vector2::new(-1.0, 0.0), -x0),
            Hs2::new(Vector2::new(0.0, 1.0), y1),
            Hs2::new(Vector2::new(0.0, -1.0), -y0),
        ]
    }
}

/// 2D affine map: `x ↦ M x + t`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine2 {
    pub m: Matrix2<f64>,
    pub t: Vector2<f64>,
}

impl Affine2 {
    #[inline]
    pub fn identity() -> Self {
        Self {
            m: Matrix2::identity(),
            t: Vector2::zeros(),
        }
    }
    /// Counter-clockwise rotation by `deg` degrees about `center`.
    pub fn rotation_about(deg: f64, center: Vector2<f64>) -> Self {
        let th = deg.to_radians();
        let m = Matrix2::new(th.cos(), -th.sin(), th.sin(), th.cos());
        Self {
            m,
            t: center - m * center,
        }
    }
    #[inline]
    pub fn apply(&self, p: Vector2<f64>) -> Vector2<f64> {
        self.m * p + self.t
    }
    /// `self ∘ inner`: apply `inner` first.
    #[inline]
    pub fn compose(&self, inner: &Affine2) -> Self {
        Self {
            m: self.m * inner.m,
            t: self.m * inner.t + self.t,
        }
    }
    #[inline]
    pub fn inverse(&self) -> Option<Self> {
        self.m.try_inverse().map(|minv| Self {
            m: minv,
            t: -minv * self.t,
        })
    }
    #[inline]
    pub fn is_orientation_preserving(&self) -> bool {
        self.m.determinant() > 0.0
    }
}
