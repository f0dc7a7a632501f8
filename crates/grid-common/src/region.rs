//! Zones that suitable area is aggregated over.

use crate::BoundingBox;
use geo::{BoundingRect, MultiPolygon};

/// Index of a region within the slice it was loaded into.
pub type RegionId = u16;

/// A named polygon zone, such as an Exclusive Economic Zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Unique short code (e.g. "CA-N").
    pub key: String,
    /// Display name.
    pub name: String,
    /// Total area of the polygon in km², supplied with the reference data.
    pub total_area_km2: f64,
    /// Polygon geometry in the same CRS as the grids.
    pub geometry: MultiPolygon<f64>,
}

impl Region {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        total_area_km2: f64,
        geometry: MultiPolygon<f64>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            total_area_km2,
            geometry,
        }
    }

    /// Bounding box of the geometry, `None` for an empty geometry.
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.geometry.bounding_rect().map(BoundingBox::from)
    }
}
