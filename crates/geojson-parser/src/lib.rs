//! GeoJSON loader for region polygons and basemap outlines.
//!
//! Regions (for example Exclusive Economic Zones) are read from a
//! FeatureCollection of `Polygon`/`MultiPolygon` features whose properties
//! carry a unique key, a display name and optionally the area in km².
//! Outline layers (coastlines) accept any line or polygon geometry and are
//! only used for drawing.

pub mod error;
pub mod loader;
pub mod types;

pub use error::{GeoJsonError, GeoJsonResult};
pub use loader::{
    load_outline, load_regions, parse_feature_collection, read_feature_collection,
    regions_from_collection, RegionFields,
};
pub use types::{Feature, FeatureCollection, Geometry};
