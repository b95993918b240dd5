//! Criterion microbenches for the rasterizer and the distance formula.
//!
//! - Random star-shaped parcels (8–64 vertices) at four rotations.
//! - Distance formula over the resulting cell sets.
//!
//! Results live under `target/criterion`.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon};
use rand::{rngs::StdRng, Rng, SeedableRng};
use yarding::distance::{compute_from_cells, CalcMode};
use yarding::raster::{rasterize_world, Cell, GridConfig};
use yarding::transform::{Transform, ViewParams};

fn star(rng: &mut StdRng, n: usize, radius: f64) -> MultiPolygon<f64> {
    let step = std::f64::consts::TAU / n as f64;
    let ring: Vec<Coord<f64>> = (0..n)
        .map(|i| {
            let r = radius * rng.gen_range(0.4..1.0);
            let a = i as f64 * step + rng.gen_range(0.0..0.5 * step);
            Coord {
                x: 300.0 + r * a.cos(),
                y: 300.0 + r * a.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::new(ring), vec![]).into()
}

fn bench_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize");
    let grid = GridConfig::default();
    let mut rng = StdRng::seed_from_u64(42);
    for &n in &[8usize, 24, 64] {
        let parcel = star(&mut rng, n, 300.0);
        let bbox = parcel.bounding_rect().unwrap();
        for &deg in &[0.0, 15.0, 45.0, 90.0] {
            let view = ViewParams {
                rotation_deg: deg,
                ..ViewParams::default()
            };
            let t = Transform::new(bbox, &grid, 25.0, view).unwrap();
            group.bench_function(BenchmarkId::new(format!("star{n}"), deg), |b| {
                b.iter(|| rasterize_world(&grid, &t, &parcel))
            });
        }
    }
    group.finish();
}

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance");
    let grid = GridConfig::default();
    let mut rng = StdRng::seed_from_u64(7);
    let parcel = star(&mut rng, 32, 300.0);
    let t = Transform::new(parcel.bounding_rect().unwrap(), &grid, 25.0, ViewParams::default()).unwrap();
    let cells = rasterize_world(&grid, &t, &parcel);
    group.bench_function(BenchmarkId::new("compute_from_cells", cells.len()), |b| {
        b.iter_batched(
            || cells.clone(),
            |cells| compute_from_cells(cells, Cell::new(22, 15), CalcMode::Internal, 25.0, &grid),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_rasterize, bench_distance);
criterion_main!(benches);
