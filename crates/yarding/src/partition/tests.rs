use super::*;
use geo::{line_string, polygon, Area as _, Centroid};

fn square10() -> MultiPolygon<f64> {
    polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)].into()
}

fn centroid_of(area: &Area) -> (f64, f64) {
    let c = area.geometry.centroid().unwrap();
    (c.x(), c.y())
}

#[test]
fn labels_are_spreadsheet_style() {
    assert_eq!(area_label(0), "A");
    assert_eq!(area_label(2), "C");
    assert_eq!(area_label(25), "Z");
    assert_eq!(area_label(26), "AA");
    assert_eq!(area_label(27), "AB");
}

#[test]
fn vertical_cut_gives_two_halves_west_first() {
    let cut = line_string![(x: 5.0, y: 0.0), (x: 5.0, y: 10.0)];
    let areas = partition(&square10(), &[cut]).unwrap();
    assert_eq!(areas.len(), 2);
    for a in &areas {
        assert!((a.geometry.unsigned_area() - 50.0).abs() < 1e-9);
        assert!(a.landing.is_none() && a.result.is_none());
    }
    assert_eq!((areas[0].id, areas[0].name.as_str()), (1, "A"));
    assert_eq!((areas[1].id, areas[1].name.as_str()), (2, "B"));
    assert!((centroid_of(&areas[0]).0 - 2.5).abs() < 1e-9);
    assert!((centroid_of(&areas[1]).0 - 7.5).abs() < 1e-9);
}

#[test]
fn overshooting_cut_is_trimmed() {
    let cut = line_string![(x: 5.0, y: -4.0), (x: 5.0, y: 14.0)];
    let areas = partition(&square10(), &[cut]).unwrap();
    assert_eq!(areas.len(), 2);
    let total: f64 = areas.iter().map(|a| a.geometry.unsigned_area()).sum();
    assert!((total - 100.0).abs() < 1e-9);
}

#[test]
fn cross_cut_orders_north_to_south_then_west_to_east() {
    let v = line_string![(x: 4.0, y: -1.0), (x: 4.0, y: 11.0)];
    let h = line_string![(x: -1.0, y: 7.0), (x: 11.0, y: 7.0)];
    let areas = partition(&square10(), &[v, h]).unwrap();
    let names: Vec<_> = areas.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C", "D"]);
    let cs: Vec<_> = areas.iter().map(centroid_of).collect();
    // A: north-west, B: north-east, C: south-west, D: south-east
    assert!(cs[0].1 > cs[2].1 && cs[0].0 < cs[1].0);
    assert!(cs[2].0 < cs[3].0);
    assert!((areas[3].geometry.unsigned_area() - 6.0 * 7.0).abs() < 1e-9);
}

#[test]
fn polyline_cut_with_bends() {
    let cut = line_string![(x: 3.0, y: -1.0), (x: 3.0, y: 5.0), (x: 7.0, y: 5.0), (x: 7.0, y: 11.0)];
    let areas = partition(&square10(), &[cut]).unwrap();
    assert_eq!(areas.len(), 2);
    // west piece: 3×5 + 7×5 = 50
    let total: f64 = areas.iter().map(|a| a.geometry.unsigned_area()).sum();
    assert!((total - 100.0).abs() < 1e-9);
}

#[test]
fn cut_outside_parcel_is_a_validation_error() {
    let cut = line_string![(x: 20.0, y: -5.0), (x: 20.0, y: 15.0)];
    assert_eq!(
        partition(&square10(), &[cut]).unwrap_err(),
        ValidationError::DegeneratePartition { found: 1 }
    );
}

#[test]
fn cut_that_stops_inside_does_not_split() {
    let cut = line_string![(x: 5.0, y: -1.0), (x: 5.0, y: 6.0)];
    assert!(matches!(
        partition(&square10(), &[cut]),
        Err(ValidationError::DegeneratePartition { .. })
    ));
}

#[test]
fn stray_line_next_to_a_good_cut_is_ignored() {
    let good = line_string![(x: 5.0, y: -1.0), (x: 5.0, y: 11.0)];
    let stray = line_string![(x: 30.0, y: 0.0), (x: 40.0, y: 10.0)];
    assert_eq!(partition(&square10(), &[stray, good]).unwrap().len(), 2);
}

#[test]
fn missing_lines_and_empty_parcel() {
    assert_eq!(partition(&square10(), &[]).unwrap_err(), ValidationError::NoCutLines);
    let single_point = line_string![(x: 5.0, y: 5.0)];
    assert_eq!(
        partition(&square10(), &[single_point]).unwrap_err(),
        ValidationError::NoCutLines
    );
    let cut = line_string![(x: 5.0, y: -1.0), (x: 5.0, y: 11.0)];
    assert_eq!(
        partition(&MultiPolygon::new(vec![]), &[cut]).unwrap_err(),
        ValidationError::EmptyGeometry
    );
}

#[test]
fn cut_through_a_hole_keeps_the_hole_out() {
    let parcel: MultiPolygon<f64> = polygon!(
        exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
        interiors: [[(x: 4.0, y: 4.0), (x: 6.0, y: 4.0), (x: 6.0, y: 6.0), (x: 4.0, y: 6.0)]],
    )
    .into();
    let cut = line_string![(x: 5.0, y: -1.0), (x: 5.0, y: 11.0)];
    let areas = partition(&parcel, &[cut]).unwrap();
    assert_eq!(areas.len(), 2);
    for a in &areas {
        assert!((a.geometry.unsigned_area() - 48.0).abs() < 1e-9);
    }
}

#[test]
fn repair_resolves_bow_tie() {
    let bow: MultiPolygon<f64> =
        polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 10.0), (x: 10.0, y: 0.0), (x: 0.0, y: 10.0)].into();
    assert!(!is_valid(&bow));
    assert!((repair(&bow).unsigned_area() - 50.0).abs() < 1e-6);
}

#[test]
fn rows_are_grouped_by_tolerance_not_by_bucket() {
    let eps = 1e-7;
    // 0.49·eps and 0.51·eps straddle a rounding boundary but are one row
    let c = [
        Vector2::new(10.0, 0.51 * eps),
        Vector2::new(0.0, 0.49 * eps),
        Vector2::new(5.0, 20.0),
        Vector2::new(20.0, -3.0 * eps),
    ];
    assert_eq!(reading_order(&c, eps), [2, 1, 0, 3]);

    // a run of small steps stays one row
    let chain = [
        Vector2::new(3.0, 0.0),
        Vector2::new(2.0, 0.9 * eps),
        Vector2::new(1.0, 1.8 * eps),
    ];
    assert_eq!(reading_order(&chain, eps), [2, 1, 0]);
}

#[test]
fn overlapping_parts_are_merged_before_cutting() {
    let two: MultiPolygon<f64> = MultiPolygon::new(vec![
        polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
        polygon![(x: 5.0, y: 0.0), (x: 15.0, y: 0.0), (x: 15.0, y: 10.0), (x: 5.0, y: 10.0)],
    ]);
    assert!(is_valid(&two));
    let merged = validated_parcel(&two).unwrap();
    assert_eq!(merged.0.len(), 1);
    assert!((merged.unsigned_area() - 150.0).abs() < 1e-9);

    let cut = line_string![(x: 7.5, y: -1.0), (x: 7.5, y: 11.0)];
    let areas = partition(&two, &[cut]).unwrap();
    assert_eq!(areas.len(), 2);
    let total: f64 = areas.iter().map(|a| a.geometry.unsigned_area()).sum();
    assert!((total - 150.0).abs() < 1e-9);
    assert!(centroid_of(&areas[0]).0 < centroid_of(&areas[1]).0);
}
