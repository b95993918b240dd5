//! Planar 2D primitives shared by every stage of the pipeline.
//!
//! Purpose
//! - Keep the small amount of hand-rolled geometry in one place: affine maps
//!   for world ↔ scene, half-spaces for clipping rings against grid cells,
//!   shoelace areas and ring-simplicity checks.
//! - Everything heavier (overlay, interior points, containment) comes from `geo`.
//!
//! Code cross-refs: `Affine2`, `Hs2`, `GeomCfg`, `util::{clip_ring, clipped_area, is_valid}`

mod types;
pub mod util;

pub use types::{Affine2, GeomCfg, Hs2};

#[cfg(test)]
mod tests;
