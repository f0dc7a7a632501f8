//! Georeferenced raster grids.

use crate::{BoundingBox, CrsCode};
use serde::{Deserialize, Serialize};

/// Relative tolerance used when comparing transforms of two grids.
const TRANSFORM_TOLERANCE: f64 = 1e-9;

/// Affine transform from cell indices to CRS coordinates.
///
/// Same layout as a GDAL geotransform: the origin is the outer top-left
/// corner of cell (0, 0), `pixel_height` is negative for north-up grids.
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub row_rotation: f64,
    pub col_rotation: f64,
}

impl GeoTransform {
    /// North-up transform from the top-left corner and positive cell sizes.
    pub fn north_up(origin_x: f64, origin_y: f64, cell_width: f64, cell_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width: cell_width,
            pixel_height: -cell_height.abs(),
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// True when the grid has no rotation terms.
    pub fn is_north_up(&self) -> bool {
        self.row_rotation == 0.0 && self.col_rotation == 0.0 && self.pixel_height < 0.0
    }

    /// Map fractional cell coordinates to CRS coordinates.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width + row * self.row_rotation,
            self.origin_y + col * self.col_rotation + row * self.pixel_height,
        )
    }

    /// Map CRS coordinates to fractional cell coordinates (north-up only).
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.pixel_width,
            (y - self.origin_y) / self.pixel_height,
        )
    }

    fn approx_eq(&self, other: &GeoTransform) -> bool {
        let scale = self
            .pixel_width
            .abs()
            .max(self.pixel_height.abs())
            .max(f64::MIN_POSITIVE);
        let close = |a: f64, b: f64| (a - b).abs() <= TRANSFORM_TOLERANCE * scale.max(a.abs());

        close(self.origin_x, other.origin_x)
            && close(self.origin_y, other.origin_y)
            && close(self.pixel_width, other.pixel_width)
            && close(self.pixel_height, other.pixel_height)
            && close(self.row_rotation, other.row_rotation)
            && close(self.col_rotation, other.col_rotation)
    }
}

/// Shape, placement and CRS of a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    pub transform: GeoTransform,
    pub crs: CrsCode,
}

impl GridSpec {
    pub fn new(width: usize, height: usize, transform: GeoTransform, crs: CrsCode) -> Self {
        Self {
            width,
            height,
            transform,
            crs,
        }
    }

    /// Outer extent of the grid (cell edges, not centres).
    pub fn bbox(&self) -> BoundingBox {
        let corners = [
            self.transform.apply(0.0, 0.0),
            self.transform.apply(self.width as f64, 0.0),
            self.transform.apply(0.0, self.height as f64),
            self.transform.apply(self.width as f64, self.height as f64),
        ];

        let mut bbox = BoundingBox::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for (x, y) in corners {
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_y = bbox.max_y.max(y);
        }
        bbox
    }

    /// Coordinates of the centre of a cell.
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.transform.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Bounds of a single cell (north-up grids).
    pub fn cell_bounds(&self, col: usize, row: usize) -> BoundingBox {
        let (x0, y0) = self.transform.apply(col as f64, row as f64);
        let (x1, y1) = self.transform.apply(col as f64 + 1.0, row as f64 + 1.0);
        BoundingBox::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }

    /// Cell containing a coordinate, if any.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let (col, row) = self.transform.invert(x, y);
        if col < 0.0 || row < 0.0 {
            return None;
        }

        let (col, row) = (col.floor() as usize, row.floor() as usize);
        if col >= self.width || row >= self.height {
            return None;
        }

        Some((col, row))
    }

    /// Get the 1D array index for a 2D grid position.
    pub fn flat_index(&self, col: usize, row: usize) -> usize {
        row * self.width + col
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Check if grid is empty.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when both grids share shape, transform and CRS, so they can be
    /// combined cell by cell.
    pub fn is_aligned_with(&self, other: &GridSpec) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.crs == other.crs
            && self.transform.approx_eq(&other.transform)
    }
}

/// A single-band raster of `f32` cells. `NaN` marks no-data.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub spec: GridSpec,
    /// Row-major cell values, row 0 at the top.
    pub data: Vec<f32>,
}

impl Grid {
    /// Build a grid, checking that the data length matches the spec.
    pub fn new(spec: GridSpec, data: Vec<f32>) -> Option<Self> {
        if data.len() != spec.len() {
            return None;
        }
        Some(Self { spec, data })
    }

    /// A grid with every cell set to `value`.
    pub fn filled(spec: GridSpec, value: f32) -> Self {
        let data = vec![value; spec.len()];
        Self { spec, data }
    }

    /// Get the value at a cell.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.spec.width || row >= self.spec.height {
            return None;
        }
        self.data.get(self.spec.flat_index(col, row)).copied()
    }

    /// Value at a coordinate (cell lookup, no interpolation).
    pub fn value_at(&self, x: f64, y: f64) -> Option<f32> {
        let (col, row) = self.spec.cell_at(x, y)?;
        self.get(col, row)
    }

    /// Apply `f` to every cell, keeping the spec.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Grid {
        Grid {
            spec: self.spec.clone(),
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Number of cells that are not no-data.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    /// Min and max of valid cells, `None` if every cell is no-data.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
