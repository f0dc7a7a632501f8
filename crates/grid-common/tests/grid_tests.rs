//! Tests for BoundingBox and GridSpec geometry.

use grid_common::{BoundingBox, CrsCode, GeoTransform, Grid, GridSpec};

// ============================================================================
// BoundingBox tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    assert_eq!(bbox.min_x, -180.0);
    assert_eq!(bbox.min_y, -90.0);
    assert_eq!(bbox.max_x, 180.0);
    assert_eq!(bbox.max_y, 90.0);
    assert_eq!(bbox.width(), 360.0);
    assert_eq!(bbox.height(), 180.0);
}

#[test]
fn test_bbox_union_and_expand() {
    let oregon = BoundingBox::new(-126.0, 42.0, -124.0, 46.0);
    let washington = BoundingBox::new(-127.0, 46.0, -124.5, 48.5);

    let union = oregon.union(&washington);
    assert_eq!(union, BoundingBox::new(-127.0, 42.0, -124.0, 48.5));

    let padded = union.expand(0.5);
    assert_eq!(padded, BoundingBox::new(-127.5, 41.5, -123.5, 49.0));
}

#[test]
fn test_bbox_contains_point_on_edge() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(0.0, 0.0));
    assert!(bbox.contains_point(10.0, 5.0));
    assert!(!bbox.contains_point(10.01, 5.0));
}

#[test]
fn test_bbox_geo_rect_conversion() {
    let bbox = BoundingBox::new(-125.0, 32.0, -117.0, 42.0);
    let rect: geo::Rect<f64> = bbox.into();
    assert_eq!(BoundingBox::from(rect), bbox);
}

// ============================================================================
// GridSpec tests
// ============================================================================

fn west_coast_spec() -> GridSpec {
    // 0.25 degree cells covering 130W..115W, 30N..50N
    GridSpec::new(
        60,
        80,
        GeoTransform::north_up(-130.0, 50.0, 0.25, 0.25),
        CrsCode::Epsg4326,
    )
}

#[test]
fn test_spec_extent() {
    let spec = west_coast_spec();
    let bbox = spec.bbox();
    assert!((bbox.min_x - -130.0).abs() < 1e-9);
    assert!((bbox.max_x - -115.0).abs() < 1e-9);
    assert!((bbox.min_y - 30.0).abs() < 1e-9);
    assert!((bbox.max_y - 50.0).abs() < 1e-9);
    assert_eq!(spec.len(), 4800);
    assert!(!spec.is_empty());
}

#[test]
fn test_cell_bounds_tile_the_extent() {
    let spec = west_coast_spec();
    let first = spec.cell_bounds(0, 0);
    let last = spec.cell_bounds(59, 79);

    assert_eq!(first, BoundingBox::new(-130.0, 49.75, -129.75, 50.0));
    assert!((last.max_x - -115.0).abs() < 1e-9);
    assert!((last.min_y - 30.0).abs() < 1e-9);
}

#[test]
fn test_center_lookup_round_trip() {
    let spec = west_coast_spec();
    for (col, row) in [(0, 0), (17, 33), (59, 79)] {
        let (x, y) = spec.cell_center(col, row);
        assert_eq!(spec.cell_at(x, y), Some((col, row)));
    }
}

#[test]
fn test_grid_value_at() {
    let spec = GridSpec::new(
        2,
        1,
        GeoTransform::north_up(0.0, 1.0, 1.0, 1.0),
        CrsCode::Epsg4326,
    );
    let grid = Grid::new(spec, vec![5.0, 7.0]).unwrap();

    assert_eq!(grid.value_at(0.5, 0.5), Some(5.0));
    assert_eq!(grid.value_at(1.5, 0.5), Some(7.0));
    assert_eq!(grid.value_at(2.5, 0.5), None);
}

#[test]
fn test_north_up_detection() {
    let mut transform = GeoTransform::north_up(0.0, 0.0, 1.0, 1.0);
    assert!(transform.is_north_up());
    assert_eq!(transform.pixel_height, -1.0);

    transform.row_rotation = 0.1;
    assert!(!transform.is_north_up());
}
