//! Bringing temperature and depth grids onto one grid.
//!
//! ```text
//! temperature years ──► mean_grid ──► to °C ───────────────┐
//!                                                          ├─► AlignedGrids
//! depth ──► crop(mean extent) ──► resample(mean spec) ─────┘
//! ```

use crate::config::AlignConfig;
use crate::interpolation::{bilinear_interpolate, nearest_interpolate};
use crate::types::ResampleMethod;
use grid_common::{BoundingBox, Grid, GridSpec, SuitabilityError, SuitabilityResult};
use tracing::{debug, info, warn};

/// Fractional cell offsets closer than this to a whole cell count as whole.
const SNAP_TOLERANCE: f64 = 1e-6;

/// Mean temperature and depth on one shared grid.
#[derive(Debug, Clone)]
pub struct AlignedGrids {
    /// Multi-year mean temperature in °C.
    pub mean_temperature: Grid,
    /// Depth (elevation) resampled onto the temperature grid.
    pub depth: Grid,
}

/// Align yearly temperature grids and a depth grid.
///
/// The temperature grids are averaged and converted to °C; the depth grid
/// is cropped to the temperature extent and resampled onto its cells.
pub fn align(
    temp_grids: &[Grid],
    depth: &Grid,
    config: &AlignConfig,
) -> SuitabilityResult<AlignedGrids> {
    let mean = mean_grid(temp_grids)?;
    require_north_up(&mean, "temperature")?;
    require_north_up(depth, "depth")?;

    if depth.spec.crs != mean.spec.crs {
        return Err(SuitabilityError::alignment(format!(
            "depth grid is in {} but temperature grids are in {}",
            depth.spec.crs, mean.spec.crs
        )));
    }

    let unit = config.temperature_unit;
    let mean_temperature = mean.map(|v| unit.to_celsius(v));

    let extent = mean_temperature.spec.bbox();
    let cropped = crop(depth, &extent)?;
    let depth = resample(&cropped, &mean_temperature.spec, config.resample)?;

    if depth.valid_count() == 0 {
        warn!("Resampled depth grid has no valid cells");
    }

    info!(
        years = temp_grids.len(),
        width = mean_temperature.spec.width,
        height = mean_temperature.spec.height,
        resample = %config.resample,
        "Aligned temperature and depth grids"
    );

    Ok(AlignedGrids {
        mean_temperature,
        depth,
    })
}

/// Cellwise arithmetic mean. A cell that is no-data in any input is
/// no-data in the result.
pub fn mean_grid(grids: &[Grid]) -> SuitabilityResult<Grid> {
    let first = grids.first().ok_or_else(|| {
        SuitabilityError::configuration("at least one temperature grid is required")
    })?;

    for (i, grid) in grids.iter().enumerate().skip(1) {
        if !grid.spec.is_aligned_with(&first.spec) {
            return Err(SuitabilityError::alignment(format!(
                "temperature grid {} does not match the grid of the first year",
                i
            )));
        }
    }

    let count = grids.len() as f64;
    let mut data = Vec::with_capacity(first.data.len());
    for i in 0..first.data.len() {
        let sum: f64 = grids.iter().map(|g| g.data[i] as f64).sum();
        data.push((sum / count) as f32);
    }

    Ok(Grid {
        spec: first.spec.clone(),
        data,
    })
}

/// Crop a grid to `extent`, snapping outward to whole cells.
pub fn crop(grid: &Grid, extent: &BoundingBox) -> SuitabilityResult<Grid> {
    require_north_up(grid, "cropped")?;

    let spec = &grid.spec;
    let overlap = spec
        .bbox()
        .intersection(extent)
        .ok_or_else(|| SuitabilityError::alignment("grid does not overlap the crop extent"))?;

    let t = &spec.transform;
    let (left, top) = t.invert(overlap.min_x, overlap.max_y);
    let (right, bottom) = t.invert(overlap.max_x, overlap.min_y);

    let col0 = snap_floor(left).clamp(0.0, spec.width as f64) as usize;
    let row0 = snap_floor(top).clamp(0.0, spec.height as f64) as usize;
    let col1 = snap_ceil(right).clamp(0.0, spec.width as f64) as usize;
    let row1 = snap_ceil(bottom).clamp(0.0, spec.height as f64) as usize;

    if col1 <= col0 || row1 <= row0 {
        return Err(SuitabilityError::alignment(
            "crop extent covers no whole or partial cell",
        ));
    }

    let width = col1 - col0;
    let height = row1 - row0;
    let mut data = Vec::with_capacity(width * height);
    for row in row0..row1 {
        let start = spec.flat_index(col0, row);
        data.extend_from_slice(&grid.data[start..start + width]);
    }

    let (origin_x, origin_y) = t.apply(col0 as f64, row0 as f64);
    let mut transform = *t;
    transform.origin_x = origin_x;
    transform.origin_y = origin_y;

    debug!(
        col0 = col0,
        row0 = row0,
        width = width,
        height = height,
        "Cropped grid"
    );

    Ok(Grid {
        spec: GridSpec::new(width, height, transform, spec.crs),
        data,
    })
}

/// Sample `source` at every cell centre of `target`.
pub fn resample(
    source: &Grid,
    target: &GridSpec,
    method: ResampleMethod,
) -> SuitabilityResult<Grid> {
    require_north_up(source, "source")?;
    if source.spec.crs != target.crs {
        return Err(SuitabilityError::alignment(format!(
            "cannot resample {} onto {} without reprojection",
            source.spec.crs, target.crs
        )));
    }

    let src = &source.spec;
    let mut data = Vec::with_capacity(target.len());
    for row in 0..target.height {
        for col in 0..target.width {
            let (x, y) = target.cell_center(col, row);
            let (sx, sy) = src.transform.invert(x, y);
            let value = match method {
                ResampleMethod::Nearest => {
                    nearest_interpolate(&source.data, src.width, src.height, sx, sy)
                }
                ResampleMethod::Bilinear => {
                    bilinear_interpolate(&source.data, src.width, src.height, sx, sy)
                }
            };
            data.push(value);
        }
    }

    Ok(Grid {
        spec: target.clone(),
        data,
    })
}

fn require_north_up(grid: &Grid, what: &str) -> SuitabilityResult<()> {
    if !grid.spec.transform.is_north_up() {
        return Err(SuitabilityError::alignment(format!(
            "{} grid is rotated or not north-up",
            what
        )));
    }
    Ok(())
}

fn snap_floor(v: f64) -> f64 {
    (v + SNAP_TOLERANCE).floor()
}

fn snap_ceil(v: f64) -> f64 {
    (v - SNAP_TOLERANCE).ceil()
}
