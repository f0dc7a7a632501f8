//! Cell areas and suitable area per region.

use crate::zones::RegionRaster;
use geo::{GeodesicArea, Polygon};
use grid_common::{AreaUnit, Grid, GridSpec, Region, SuitabilityError, SuitabilityResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Sphere radius of EPSG:3857.
const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Relative slack allowed when comparing suitable area against a region's
/// reference area.
const AREA_TOLERANCE: f64 = 1e-6;

/// Suitable area of one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSuitability {
    pub key: String,
    pub name: String,
    pub suitable_area_km2: f64,
    pub total_area_km2: f64,
    /// `suitable / total * 100`, in `[0, 100]`.
    pub percent_suitable: f64,
}

/// Area of every cell of a grid.
///
/// Geographic grids get the WGS84 geodesic area of each cell polygon; every
/// cell in a north-up row has the same area, so it is computed once per row.
/// Web Mercator cells are scaled by `cos²(lat)` of the row centre, undoing
/// the projection's `sec(lat)` stretch. Other projected grids use
/// `|pixel_width * pixel_height|`, taking the CRS unit as metres.
pub fn cell_area(spec: &GridSpec, unit: AreaUnit) -> Grid {
    let mut data = Vec::with_capacity(spec.len());

    if spec.crs.is_geographic() {
        for row in 0..spec.height {
            let bounds = spec.cell_bounds(0, row);
            let polygon: Polygon<f64> = geo::Rect::from(bounds).to_polygon();
            let area = unit.from_square_meters(polygon.geodesic_area_unsigned()) as f32;
            data.extend(std::iter::repeat(area).take(spec.width));
        }
    } else if spec.crs.is_web_mercator() {
        let t = &spec.transform;
        let nominal = (t.pixel_width * t.pixel_height).abs();
        for row in 0..spec.height {
            let bounds = spec.cell_bounds(0, row);
            let y = (bounds.min_y + bounds.max_y) / 2.0;
            let lat = (y / WEB_MERCATOR_RADIUS_M).sinh().atan();
            let area = unit.from_square_meters(nominal * lat.cos().powi(2)) as f32;
            data.extend(std::iter::repeat(area).take(spec.width));
        }
    } else {
        let t = &spec.transform;
        let area = unit.from_square_meters((t.pixel_width * t.pixel_height).abs()) as f32;
        data.resize(spec.len(), area);
    }

    Grid {
        spec: spec.clone(),
        data,
    }
}

/// Sum suitable cell area per region and compare it to each region's area.
///
/// `regions` must be the list `raster` was built from. Every region appears
/// in the result, including regions without suitable cells.
pub fn aggregate(
    mask: &Grid,
    raster: &RegionRaster,
    cell_area_km2: &Grid,
    regions: &[Region],
) -> SuitabilityResult<BTreeMap<String, RegionSuitability>> {
    check_join(raster, regions)?;
    if !mask.spec.is_aligned_with(&raster.spec) || !mask.spec.is_aligned_with(&cell_area_km2.spec)
    {
        return Err(SuitabilityError::alignment(
            "mask, region raster and cell areas must share one grid",
        ));
    }

    let mut sums = vec![0.0f64; regions.len()];
    for ((&v, region), &area) in mask
        .data
        .iter()
        .zip(&raster.cells)
        .zip(&cell_area_km2.data)
    {
        if let Some(id) = region {
            if v == 1.0 {
                sums[*id as usize] += area as f64;
            }
        }
    }

    let mut results = BTreeMap::new();
    for (region, suitable) in regions.iter().zip(sums) {
        let total = region.total_area_km2;
        let percent = percent_suitable(&region.key, suitable, total)?;

        debug!(
            key = %region.key,
            suitable_km2 = suitable,
            total_km2 = total,
            percent = percent,
            "Aggregated region"
        );

        results.insert(
            region.key.clone(),
            RegionSuitability {
                key: region.key.clone(),
                name: region.name.clone(),
                suitable_area_km2: suitable,
                total_area_km2: total,
                percent_suitable: percent,
            },
        );
    }

    info!(
        regions = results.len(),
        suitable_km2 = results.values().map(|r| r.suitable_area_km2).sum::<f64>(),
        "Aggregated suitable area"
    );

    Ok(results)
}

/// Suitable area over the whole grid, ignoring regions.
pub fn total_suitable_area(mask: &Grid, cell_area: &Grid) -> SuitabilityResult<f64> {
    if !mask.spec.is_aligned_with(&cell_area.spec) {
        return Err(SuitabilityError::alignment(
            "mask and cell areas must share one grid",
        ));
    }

    Ok(mask
        .data
        .iter()
        .zip(&cell_area.data)
        .filter(|(v, _)| **v == 1.0)
        .map(|(_, a)| *a as f64)
        .sum())
}

fn check_join(raster: &RegionRaster, regions: &[Region]) -> SuitabilityResult<()> {
    if raster.keys.len() != regions.len() {
        return Err(SuitabilityError::join(format!(
            "region raster has {} regions but {} were supplied",
            raster.keys.len(),
            regions.len()
        )));
    }

    for (key, region) in raster.keys.iter().zip(regions) {
        if *key != region.key {
            return Err(SuitabilityError::join(format!(
                "region raster key '{}' does not match region '{}'",
                key, region.key
            )));
        }
    }

    Ok(())
}

fn percent_suitable(key: &str, suitable: f64, total: f64) -> SuitabilityResult<f64> {
    if suitable == 0.0 {
        return Ok(0.0);
    }

    let mismatch = || SuitabilityError::AreaMismatch {
        key: key.to_string(),
        suitable_km2: suitable,
        total_km2: total,
    };

    if !(total > 0.0) || suitable > total * (1.0 + AREA_TOLERANCE) {
        return Err(mismatch());
    }

    Ok((suitable / total * 100.0).min(100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use grid_common::{CrsCode, GeoTransform};

    #[test]
    fn test_projected_cell_area() {
        let spec = GridSpec::new(
            3,
            2,
            GeoTransform::north_up(0.0, 0.0, 1000.0, 500.0),
            CrsCode::Epsg5070,
        );
        let areas = cell_area(&spec, AreaUnit::SquareKilometers);
        assert!(areas.data.iter().all(|&a| (a - 0.5).abs() < 1e-6));

        let hectares = cell_area(&spec, AreaUnit::Hectares);
        assert!((hectares.data[0] - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_geodesic_cell_area_shrinks_poleward() {
        // Rows at 0..1 N and 60..61 N
        let equator = GridSpec::new(
            1,
            1,
            GeoTransform::north_up(0.0, 1.0, 1.0, 1.0),
            CrsCode::Epsg4326,
        );
        let north = GridSpec::new(
            1,
            1,
            GeoTransform::north_up(0.0, 61.0, 1.0, 1.0),
            CrsCode::Epsg4326,
        );

        let a0 = cell_area(&equator, AreaUnit::SquareKilometers).data[0] as f64;
        let a60 = cell_area(&north, AreaUnit::SquareKilometers).data[0] as f64;

        // A 1x1 degree cell at the equator is about 12,309 km2
        assert_relative_eq!(a0, 12_309.0, max_relative = 0.01);
        assert!(a60 < a0 * 0.6);
    }

    #[test]
    fn test_web_mercator_cell_area_shrinks_with_latitude() {
        // 10 km cell centred near 40 N
        let spec = GridSpec::new(
            1,
            1,
            GeoTransform::north_up(0.0, 4_875_000.0, 10_000.0, 10_000.0),
            CrsCode::Epsg3857,
        );
        let area = cell_area(&spec, AreaUnit::SquareKilometers).data[0] as f64;

        let y: f64 = 4_870_000.0;
        let lat = (y / 6_378_137.0).sinh().atan();
        assert_relative_eq!(lat.to_degrees(), 40.0, epsilon = 0.2);
        assert_relative_eq!(area, 100.0 * lat.cos().powi(2), max_relative = 1e-5);
        assert!(area > 57.0 && area < 60.0);

        let equator = GridSpec::new(
            1,
            1,
            GeoTransform::north_up(0.0, 5_000.0, 10_000.0, 10_000.0),
            CrsCode::Epsg3857,
        );
        let a0 = cell_area(&equator, AreaUnit::SquareKilometers).data[0] as f64;
        assert_relative_eq!(a0, 100.0, max_relative = 1e-5);
    }

    #[test]
    fn test_other_geographic_crs_uses_geodesic_area() {
        // 1x1 degree cell at 40..41 N in ETRS89
        let spec = GridSpec::new(
            1,
            1,
            GeoTransform::north_up(0.0, 41.0, 1.0, 1.0),
            CrsCode::from_epsg(4258),
        );
        let area = cell_area(&spec, AreaUnit::SquareKilometers).data[0] as f64;
        assert_relative_eq!(area, 9_400.0, max_relative = 0.02);
    }

    #[test]
    fn test_percent_rules() {
        assert_eq!(percent_suitable("A", 0.0, 0.0).unwrap(), 0.0);
        assert_eq!(percent_suitable("A", 250.0, 1000.0).unwrap(), 25.0);
        assert_eq!(percent_suitable("A", 1000.0, 1000.0).unwrap(), 100.0);
        assert!(matches!(
            percent_suitable("A", 1001.0, 1000.0),
            Err(SuitabilityError::AreaMismatch { .. })
        ));
        assert!(percent_suitable("A", 1.0, 0.0).is_err());
    }
}
