//! Common test fixtures for suitability tests.
//!
//! Besides in-memory constants, [`write_fixture_set`] writes a complete,
//! small input dataset (three SST years, bathymetry, two regions and a
//! coastline) to a temporary directory for end-to-end runs.

use crate::generators::{create_bathymetry_grid, create_sst_grid, geographic_spec};
use grid_common::BoundingBox;
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

/// Common bounding box definitions for testing.
pub mod bbox {
    use grid_common::BoundingBox;

    /// Extent of the fixture SST grids
    pub const FIXTURE_SST: BoundingBox = BoundingBox {
        min_x: -126.0,
        min_y: 38.0,
        max_x: -122.0,
        max_y: 42.0,
    };
}

/// Layout of the on-disk fixture set.
///
/// SST: 8x8 cells of 0.5° from (-126, 42), 8.2 °C in column 0 warming by
/// 1.5 °C per column, year offsets of -0.5/0/+0.5 °C. Cell (7, 0) is land
/// (no-data) in every year.
///
/// Bathymetry: 30x30 cells of 0.2° from (-127, 43), elevation
/// `(lon + 121) * 40` m. Only SST columns 6 and 7 resample to depths in
/// the oyster range.
///
/// Regions: "N" covers 40.2..42°N and "S" covers 38..40.2°N, both spanning
/// the full SST longitude range. Both touch SST row 3; "S" is listed last
/// and claims it.
pub mod layout {
    pub const SST_WIDTH: usize = 8;
    pub const SST_HEIGHT: usize = 8;
    pub const SST_CELL_DEG: f64 = 0.5;
    pub const SST_YEARS: [i32; 3] = [2008, 2009, 2010];
    pub const LAND_CELL: (usize, usize) = (7, 0);

    /// Suitable oyster cells per region: rows 0..=2 and 3..=7 of columns 6
    /// and 7, minus the land cell.
    pub const NORTH_SUITABLE_CELLS: usize = 5;
    pub const SOUTH_SUITABLE_CELLS: usize = 10;

    pub const NORTH_AREA_KM2: f64 = 67_000.0;
    pub const SOUTH_AREA_KM2: f64 = 85_000.0;
}

/// Paths of a fixture set written to a temporary directory. The files are
/// removed when this is dropped.
pub struct FixtureSet {
    pub dir: TempDir,
    pub sst_paths: Vec<PathBuf>,
    pub bathymetry_path: PathBuf,
    pub eez_path: PathBuf,
    pub coastline_path: PathBuf,
}

/// Write the fixture set described in [`layout`].
pub fn write_fixture_set() -> FixtureSet {
    let dir = crate::temp_test_dir_with_prefix("suitability_fixture_");

    let sst_spec = geographic_spec(
        bbox::FIXTURE_SST.min_x,
        bbox::FIXTURE_SST.max_y,
        layout::SST_CELL_DEG,
        layout::SST_WIDTH,
        layout::SST_HEIGHT,
    );

    let mut sst_paths = Vec::new();
    for (i, year) in layout::SST_YEARS.iter().enumerate() {
        let offset = (i as f32 - 1.0) * 0.5;
        let mut grid = create_sst_grid(sst_spec.clone(), 8.2 + offset, 1.5);
        let (col, row) = layout::LAND_CELL;
        let index = grid.spec.flat_index(col, row);
        grid.data[index] = f32::NAN;

        let path = dir.path().join(format!("average_annual_sst_{}.tif", year));
        geotiff_parser::write_geotiff(&path, &grid).expect("write SST fixture");
        sst_paths.push(path);
    }

    let depth_spec = geographic_spec(-127.0, 43.0, 0.2, 30, 30);
    let depth = create_bathymetry_grid(depth_spec, -121.0, 40.0);
    let bathymetry_path = dir.path().join("depth.tif");
    geotiff_parser::write_geotiff(&bathymetry_path, &depth).expect("write depth fixture");

    let north = BoundingBox::new(-126.0, 40.2, -122.0, 42.0);
    let south = BoundingBox::new(-126.0, 38.0, -122.0, 40.2);
    let eez = json!({
        "type": "FeatureCollection",
        "features": [
            region_feature("N", "North Coast", layout::NORTH_AREA_KM2, north),
            region_feature("S", "South Coast", layout::SOUTH_AREA_KM2, south),
        ]
    });
    let eez_path = dir.path().join("wc_regions.geojson");
    std::fs::write(&eez_path, eez.to_string()).expect("write region fixture");

    let coastline = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "coast"},
            "geometry": {
                "type": "LineString",
                "coordinates": [[-121.9, 42.0], [-121.95, 40.0], [-121.8, 38.0]]
            }
        }]
    });
    let coastline_path = dir.path().join("coastline.geojson");
    std::fs::write(&coastline_path, coastline.to_string()).expect("write coastline fixture");

    FixtureSet {
        dir,
        sst_paths,
        bathymetry_path,
        eez_path,
        coastline_path,
    }
}

fn region_feature(key: &str, name: &str, area_km2: f64, bbox: BoundingBox) -> serde_json::Value {
    json!({
        "type": "Feature",
        "properties": {"rgn_key": key, "rgn": name, "area_km2": area_km2},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [bbox.min_x, bbox.min_y],
                [bbox.max_x, bbox.min_y],
                [bbox.max_x, bbox.max_y],
                [bbox.min_x, bbox.max_y],
                [bbox.min_x, bbox.min_y]
            ]]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_set_files_exist() {
        let set = write_fixture_set();
        assert_eq!(set.sst_paths.len(), 3);
        for path in &set.sst_paths {
            assert!(path.exists());
        }
        assert!(set.bathymetry_path.exists());
        assert!(set.eez_path.exists());
        assert!(set.coastline_path.exists());
        assert!(set.dir.path().is_dir());
    }

    #[test]
    fn test_fixture_sst_reads_back() {
        let set = write_fixture_set();
        let grid = geotiff_parser::read_geotiff(&set.sst_paths[0]).unwrap();
        assert_eq!(grid.spec.width, layout::SST_WIDTH);
        assert_eq!(grid.valid_count(), 63);
    }
}
