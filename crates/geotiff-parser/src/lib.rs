//! GeoTIFF reader and writer for single-band rasters.
//!
//! Reads sea surface temperature and bathymetry rasters into
//! [`grid_common::Grid`]s, taking georeferencing from the ModelTiepoint,
//! ModelPixelScale and ModelTransformation tags and the CRS from the GeoKey
//! directory. The writer produces `f32` GeoTIFFs with `NaN` no-data.
//!
//! # Example
//!
//! ```ignore
//! use geotiff_parser::read_geotiff;
//!
//! let sst = read_geotiff("data/average_annual_sst_2008.tif")?;
//! println!("{}x{} in {}", sst.spec.width, sst.spec.height, sst.spec.crs);
//! ```

pub mod error;
pub mod geokeys;
mod reader;
mod writer;

pub use error::{GeoTiffError, GeoTiffResult};
pub use geokeys::GeoKeys;
pub use reader::{decode, read_geotiff};
pub use writer::{encode, write_geotiff};
