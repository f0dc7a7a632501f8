//! Generators for synthetic grids and regions.
//!
//! These create predictable, verifiable patterns so tests can state exactly
//! which cells should pass a classification or land in a region.

use geo::{polygon, MultiPolygon, Polygon};
use grid_common::{BoundingBox, CrsCode, GeoTransform, Grid, GridSpec, Region};
use grid_common::units::KELVIN_OFFSET;

/// North-up EPSG:4326 grid spec from its top-left corner and square cells.
pub fn geographic_spec(
    min_lon: f64,
    max_lat: f64,
    cell_deg: f64,
    width: usize,
    height: usize,
) -> GridSpec {
    GridSpec::new(
        width,
        height,
        GeoTransform::north_up(min_lon, max_lat, cell_deg, cell_deg),
        CrsCode::Epsg4326,
    )
}

/// Wraps values in a grid, panicking on a length mismatch.
pub fn grid_from_values(spec: GridSpec, values: Vec<f32>) -> Grid {
    let len = spec.len();
    let count = values.len();
    Grid::new(spec, values)
        .unwrap_or_else(|| panic!("expected {} values, got {}", len, count))
}

/// Sea surface temperature in Kelvin, warming eastward.
///
/// Column `c` holds `base_celsius + c * step_celsius` converted to Kelvin.
pub fn create_sst_grid(spec: GridSpec, base_celsius: f32, step_celsius: f32) -> Grid {
    let mut data = Vec::with_capacity(spec.len());
    for _row in 0..spec.height {
        for col in 0..spec.width {
            data.push(base_celsius + col as f32 * step_celsius + KELVIN_OFFSET);
        }
    }
    grid_from_values(spec, data)
}

/// Bathymetry as elevation in metres, shallowing eastward toward `shore_lon`.
///
/// Each cell holds `(centre_lon - shore_lon) * metres_per_degree`: negative
/// (below sea level) west of the shore, positive (land) east of it.
pub fn create_bathymetry_grid(spec: GridSpec, shore_lon: f64, metres_per_degree: f64) -> Grid {
    let mut data = Vec::with_capacity(spec.len());
    for row in 0..spec.height {
        for col in 0..spec.width {
            let (lon, _) = spec.cell_center(col, row);
            data.push(((lon - shore_lon) * metres_per_degree) as f32);
        }
    }
    grid_from_values(spec, data)
}

/// Axis-aligned rectangle polygon.
pub fn rect_polygon(bbox: BoundingBox) -> Polygon<f64> {
    polygon![
        (x: bbox.min_x, y: bbox.min_y),
        (x: bbox.max_x, y: bbox.min_y),
        (x: bbox.max_x, y: bbox.max_y),
        (x: bbox.min_x, y: bbox.max_y),
        (x: bbox.min_x, y: bbox.min_y),
    ]
}

/// A region whose geometry is a single rectangle.
pub fn rect_region(key: &str, name: &str, total_area_km2: f64, bbox: BoundingBox) -> Region {
    Region::new(
        key,
        name,
        total_area_km2,
        MultiPolygon::new(vec![rect_polygon(bbox)]),
    )
}

/// Cellwise equality that treats two NaNs as equal.
pub fn same_cells(a: &Grid, b: &Grid) -> bool {
    a.spec == b.spec
        && a.data.len() == b.data.len()
        && a
            .data
            .iter()
            .zip(&b.data)
            .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sst_grid_is_kelvin() {
        let grid = create_sst_grid(geographic_spec(-126.0, 42.0, 0.5, 3, 2), 10.0, 2.0);
        assert!((grid.data[0] - 283.15).abs() < 1e-3);
        assert!((grid.data[2] - 287.15).abs() < 1e-3);
        assert_eq!(grid.data[0], grid.data[3]);
    }

    #[test]
    fn test_bathymetry_shallows_to_the_east() {
        let grid = create_bathymetry_grid(geographic_spec(-126.0, 42.0, 1.0, 4, 1), -122.0, 10.0);
        assert_eq!(grid.data, vec![-35.0, -25.0, -15.0, -5.0]);
    }

    #[test]
    fn test_same_cells_with_nan() {
        let spec = geographic_spec(0.0, 1.0, 1.0, 2, 1);
        let a = grid_from_values(spec.clone(), vec![f32::NAN, 1.0]);
        let b = grid_from_values(spec.clone(), vec![f32::NAN, 1.0]);
        let c = grid_from_values(spec, vec![1.0, 1.0]);
        assert!(same_cells(&a, &b));
        assert!(!same_cells(&a, &c));
    }
}
