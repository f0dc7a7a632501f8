//! Burning region polygons into a grid of region identifiers.

use geo::coordinate_position::CoordPos;
use geo::dimensions::Dimensions;
use geo::{BoundingRect, Intersects, Polygon, Rect, Relate};
use grid_common::{
    BoundingBox, Grid, GridSpec, Region, RegionId, SuitabilityError, SuitabilityResult,
};
use tracing::{debug, warn};

/// Region membership of every cell of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRaster {
    pub spec: GridSpec,
    /// Row-major, one entry per cell; `None` outside every region.
    pub cells: Vec<Option<RegionId>>,
    /// Region keys in the order the raster was built from. A `RegionId` is
    /// an index into this list.
    pub keys: Vec<String>,
}

impl RegionRaster {
    /// Region of a cell.
    pub fn get(&self, col: usize, row: usize) -> Option<RegionId> {
        if col >= self.spec.width || row >= self.spec.height {
            return None;
        }
        self.cells[self.spec.flat_index(col, row)]
    }

    /// Key of a region id.
    pub fn key(&self, id: RegionId) -> Option<&str> {
        self.keys.get(id as usize).map(String::as_str)
    }

    /// Number of cells assigned to each region, indexed by id.
    pub fn cell_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.keys.len()];
        for id in self.cells.iter().flatten() {
            counts[*id as usize] += 1;
        }
        counts
    }
}

/// Assign every cell touched by a region polygon to that region.
///
/// A cell belongs to a region when its rectangle intersects the polygon,
/// boundary included. A polygon that reaches into the cell's interior takes
/// precedence over one that only meets the cell along its edge or at a
/// corner. Between hits of the same kind the later region wins.
pub fn rasterize(regions: &[Region], spec: &GridSpec) -> SuitabilityResult<RegionRaster> {
    if regions.len() > RegionId::MAX as usize + 1 {
        return Err(SuitabilityError::configuration(format!(
            "too many regions: {}",
            regions.len()
        )));
    }
    if !spec.transform.is_north_up() {
        return Err(SuitabilityError::alignment(
            "cannot rasterize regions onto a rotated grid",
        ));
    }

    let mut cells = vec![None; spec.len()];
    let mut interior = vec![false; spec.len()];

    for (index, region) in regions.iter().enumerate() {
        let id = index as RegionId;
        let mut assigned = 0usize;

        for polygon in region.geometry.0.iter() {
            let Some(poly_bbox) = polygon.bounding_rect().map(BoundingBox::from) else {
                continue;
            };
            let Some((col0, row0, col1, row1)) = cell_window(spec, &poly_bbox) else {
                continue;
            };

            for row in row0..row1 {
                for col in col0..col1 {
                    let rect: Rect<f64> = spec.cell_bounds(col, row).into();
                    if !polygon.intersects(&rect) {
                        continue;
                    }

                    let index = spec.flat_index(col, row);
                    let inside = reaches_interior(polygon, &rect);
                    if !inside && interior[index] {
                        continue;
                    }
                    interior[index] |= inside;
                    if cells[index] != Some(id) {
                        cells[index] = Some(id);
                        assigned += 1;
                    }
                }
            }
        }

        if assigned == 0 {
            warn!(key = %region.key, "Region does not touch any grid cell");
        } else {
            debug!(key = %region.key, cells = assigned, "Rasterized region");
        }
    }

    Ok(RegionRaster {
        spec: spec.clone(),
        cells,
        keys: regions.iter().map(|r| r.key.clone()).collect(),
    })
}

/// True when the polygon covers part of the cell's interior, not just its
/// edges.
fn reaches_interior(polygon: &Polygon<f64>, cell: &Rect<f64>) -> bool {
    polygon.relate(cell).get(CoordPos::Inside, CoordPos::Inside) != Dimensions::Empty
}

/// Set mask cells outside every region to no-data.
pub fn mask_by_region(mask: &Grid, raster: &RegionRaster) -> SuitabilityResult<Grid> {
    if !mask.spec.is_aligned_with(&raster.spec) {
        return Err(SuitabilityError::alignment(
            "region raster is not on the mask grid",
        ));
    }

    let data = mask
        .data
        .iter()
        .zip(&raster.cells)
        .map(|(&v, region)| if region.is_some() { v } else { f32::NAN })
        .collect();

    Ok(Grid {
        spec: mask.spec.clone(),
        data,
    })
}

/// Half-open `(col0, row0, col1, row1)` window of cells that may touch
/// `bbox`, padded by one cell so edge contact is tested.
fn cell_window(spec: &GridSpec, bbox: &BoundingBox) -> Option<(usize, usize, usize, usize)> {
    if !spec.bbox().intersects(bbox) {
        return None;
    }

    let t = &spec.transform;
    let (left, top) = t.invert(bbox.min_x, bbox.max_y);
    let (right, bottom) = t.invert(bbox.max_x, bbox.min_y);

    let clamp = |v: f64, max: usize| v.clamp(0.0, max as f64) as usize;
    let col0 = clamp(left.floor() - 1.0, spec.width);
    let row0 = clamp(top.floor() - 1.0, spec.height);
    let col1 = clamp(right.ceil() + 1.0, spec.width);
    let row1 = clamp(bottom.ceil() + 1.0, spec.height);

    (col0 < col1 && row0 < row1).then_some((col0, row0, col1, row1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use grid_common::{CrsCode, GeoTransform};

    fn spec_4x4() -> GridSpec {
        GridSpec::new(
            4,
            4,
            GeoTransform::north_up(0.0, 4.0, 1.0, 1.0),
            CrsCode::Epsg4326,
        )
    }

    fn rect(key: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Region {
        let poly = polygon![
            (x: min_x, y: min_y),
            (x: max_x, y: min_y),
            (x: max_x, y: max_y),
            (x: min_x, y: max_y),
            (x: min_x, y: min_y),
        ];
        Region::new(key, key, 100.0, MultiPolygon::new(vec![poly]))
    }

    #[test]
    fn test_interior_polygon_touches_one_cell() {
        let raster = rasterize(&[rect("A", 1.2, 1.2, 1.8, 1.8)], &spec_4x4()).unwrap();
        // y 1.2..1.8 is row 2
        assert_eq!(raster.get(1, 2), Some(0));
        assert_eq!(raster.cell_counts(), vec![1]);
    }

    #[test]
    fn test_boundary_contact_counts() {
        // Polygon edge on x = 2.0 also touches column 2
        let raster = rasterize(&[rect("A", 1.2, 2.2, 2.0, 2.8)], &spec_4x4()).unwrap();
        assert_eq!(raster.get(1, 1), Some(0));
        assert_eq!(raster.get(2, 1), Some(0));
        assert_eq!(raster.cell_counts(), vec![2]);
    }

    #[test]
    fn test_shared_cell_edge_keeps_cells_with_their_region() {
        // "N" above y = 2.0 and "S" below it; "S" comes last but only meets
        // row 1 along its bottom edge
        let regions = [rect("N", 0.0, 2.0, 4.0, 4.0), rect("S", 0.0, 0.0, 4.0, 2.0)];
        let raster = rasterize(&regions, &spec_4x4()).unwrap();

        assert_eq!(raster.cell_counts(), vec![8, 8]);
        for col in 0..4 {
            assert_eq!(raster.get(col, 1), Some(0));
            assert_eq!(raster.get(col, 2), Some(1));
        }
    }

    #[test]
    fn test_split_on_cell_edge_single_column() {
        let spec = GridSpec::new(
            1,
            2,
            GeoTransform::north_up(0.0, 2.0, 1.0, 1.0),
            CrsCode::Epsg4326,
        );
        let regions = [rect("N", 0.0, 1.0, 1.0, 2.0), rect("S", 0.0, 0.0, 1.0, 1.0)];
        let raster = rasterize(&regions, &spec).unwrap();
        assert_eq!(raster.cells, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_edge_contact_does_not_override_interior() {
        // "A" covers column 1 inside; "B" is listed later and only meets it at x = 2.0
        let regions = [rect("A", 1.2, 2.2, 1.8, 2.8), rect("B", 2.0, 2.2, 2.8, 2.8)];
        let raster = rasterize(&regions, &spec_4x4()).unwrap();
        assert_eq!(raster.get(1, 1), Some(0));
        assert_eq!(raster.get(2, 1), Some(1));
    }

    #[test]
    fn test_last_region_wins_on_overlap() {
        let regions = [rect("A", 0.1, 0.1, 2.5, 3.9), rect("B", 1.5, 0.1, 3.9, 3.9)];
        let raster = rasterize(&regions, &spec_4x4()).unwrap();

        assert_eq!(raster.get(0, 0), Some(0));
        assert_eq!(raster.get(1, 0), Some(1));
        assert_eq!(raster.get(2, 0), Some(1));
        assert_eq!(raster.key(1), Some("B"));
        assert_eq!(raster.cell_counts(), vec![4, 12]);
    }

    #[test]
    fn test_region_outside_grid() {
        let raster = rasterize(&[rect("far", 50.0, 50.0, 51.0, 51.0)], &spec_4x4()).unwrap();
        assert!(raster.cells.iter().all(Option::is_none));
        assert_eq!(raster.keys, vec!["far".to_string()]);
    }

    #[test]
    fn test_mask_by_region() {
        let spec = spec_4x4();
        let raster = rasterize(&[rect("A", 0.1, 3.1, 0.9, 3.9)], &spec).unwrap();
        let mask = Grid::filled(spec, 1.0);

        let masked = mask_by_region(&mask, &raster).unwrap();
        assert_eq!(masked.valid_count(), 1);
        assert_eq!(masked.get(0, 0), Some(1.0));
    }

    #[test]
    fn test_mask_by_region_unaligned() {
        let raster = rasterize(&[], &spec_4x4()).unwrap();
        let other = GridSpec::new(
            2,
            2,
            GeoTransform::north_up(0.0, 4.0, 1.0, 1.0),
            CrsCode::Epsg4326,
        );
        let mask = Grid::filled(other, 1.0);
        assert!(matches!(
            mask_by_region(&mask, &raster),
            Err(SuitabilityError::Alignment(_))
        ));
    }
}
