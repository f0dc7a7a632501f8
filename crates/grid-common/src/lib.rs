//! Common types shared across the suitability workspace.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod grid;
pub mod region;
pub mod units;

pub use bbox::BoundingBox;
pub use crs::CrsCode;
pub use error::{SuitabilityError, SuitabilityResult};
pub use grid::{GeoTransform, Grid, GridSpec};
pub use region::{Region, RegionId};
pub use units::{AreaUnit, TemperatureUnit};
