use super::util::*;
use super::*;
use geo::polygon;
use nalgebra::{matrix, vector, Vector2};

#[test]
fn affine_inverse_and_compose() {
    let f = Affine2 {
        m: matrix![2.0, 1.0; 0.0, -3.0],
        t: vector![5.0, -1.0],
    };
    let inv = f.inverse().unwrap();
    let p = vector![0.7, -2.25];
    assert!((inv.apply(f.apply(p)) - p).norm() < 1e-12);
    let id = f.compose(&inv);
    assert!((id.m - nalgebra::Matrix2::identity()).norm() < 1e-12);
    assert!(id.t.norm() < 1e-12);
    assert!(!f.is_orientation_preserving());
}

#[test]
fn rotation_about_keeps_center_fixed() {
    let c = vector![10.0, 20.0];
    let r = Affine2::rotation_about(90.0, c);
    assert!((r.apply(c) - c).norm() < 1e-12);
    let p = r.apply(vector![11.0, 20.0]);
    assert!((p - vector![10.0, 21.0]).norm() < 1e-12);
}

#[test]
fn clip_square_against_box() {
    let ring = vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(2.0, 0.0),
        Vector2::new(2.0, 2.0),
        Vector2::new(0.0, 2.0),
    ];
    let hs = Hs2::axis_box(1.0, 1.0, 3.0, 3.0);
    let clipped = clip_ring(&ring, &hs);
    assert!((signed_area(&clipped).abs() - 1.0).abs() < 1e-12);
    // disjoint box
    let far = Hs2::axis_box(5.0, 5.0, 6.0, 6.0);
    assert!(signed_area(&clip_ring(&ring, &far)).abs() < 1e-12);
}

#[test]
fn clip_concave_ring_area_is_exact() {
    // U shape: 3x3 square with a 1x2 notch cut from the top middle.
    let u = polygon![
        (x: 0.0, y: 0.0), (x: 3.0, y: 0.0), (x: 3.0, y: 3.0), (x: 2.0, y: 3.0),
        (x: 2.0, y: 1.0), (x: 1.0, y: 1.0), (x: 1.0, y: 3.0), (x: 0.0, y: 3.0),
    ];
    // upper band y∈[1,3] only contains the two arms
    let hs = Hs2::axis_box(0.0, 1.0, 3.0, 3.0);
    assert!((clipped_area(&u, &hs) - 4.0).abs() < 1e-12);
}

#[test]
fn clipped_area_subtracts_holes() {
    let p = polygon!(
        exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0)],
        interiors: [[(x: 1.0, y: 1.0), (x: 3.0, y: 1.0), (x: 3.0, y: 3.0), (x: 1.0, y: 3.0)]],
    );
    let hs = Hs2::axis_box(0.0, 0.0, 4.0, 4.0);
    assert!((clipped_area(&p, &hs) - 12.0).abs() < 1e-12);
}

#[test]
fn bow_tie_is_not_simple() {
    let bow = vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(2.0, 2.0),
        Vector2::new(2.0, 0.0),
        Vector2::new(0.0, 2.0),
    ];
    assert!(!ring_is_simple(&bow));
    let sq = vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(0.0, 1.0),
    ];
    assert!(ring_is_simple(&sq));
}
