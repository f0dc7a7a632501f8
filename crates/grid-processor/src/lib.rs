//! Raster processing for the suitability pipeline.
//!
//! This crate holds the computational core: aligning temperature and depth
//! grids, classifying them into suitability masks, rasterizing region
//! polygons and aggregating suitable area per region.
//!
//! # Architecture
//!
//! ```text
//! SST years + depth
//!      │
//!      ▼
//! align()                 mean SST in °C, depth resampled onto the SST grid
//!      │
//!      ├─► classify(sst, temp range)  ─┐
//!      ├─► classify(depth, elevation)  ├─► combine() ─► suitability mask
//!      │                               ┘
//!      ▼
//! rasterize(regions) ─► mask_by_region()
//!      │
//!      ▼
//! cell_area() ─► aggregate() ─► suitable km² and % per region
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{align, classify, combine, AlignConfig, SuitabilityRange};
//!
//! let aligned = align(&sst_years, &depth, &AlignConfig::default())?;
//! let temp = classify(&aligned.mean_temperature, &SuitabilityRange::new(11.0, 30.0)?);
//! let depth = classify(&aligned.depth, &SuitabilityRange::new(-70.0, 0.0)?);
//! let mask = combine(&[&temp, &depth])?;
//! ```

pub mod align;
pub mod area;
pub mod classify;
pub mod config;
pub mod interpolation;
pub mod types;
pub mod zones;

// Re-export commonly used types at crate root
pub use align::{align, crop, mean_grid, resample, AlignedGrids};
pub use area::{aggregate, cell_area, total_suitable_area, RegionSuitability};
pub use classify::{classify, combine, suitable_cell_count};
pub use config::AlignConfig;
pub use interpolation::{bilinear_interpolate, nearest_interpolate};
pub use types::{ResampleMethod, SuitabilityRange};
pub use zones::{mask_by_region, rasterize, RegionRaster};
