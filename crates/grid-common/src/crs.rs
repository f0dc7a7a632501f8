//! Coordinate Reference System codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CRS codes understood by the pipeline.
///
/// No reprojection is ever performed; the code only decides whether two grids
/// can be combined and which cell-area model applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lat/lon in degrees)
    Epsg4326,
    /// NAD83 Geographic
    Epsg4269,
    /// Web Mercator (meters)
    Epsg3857,
    /// CONUS Albers Equal Area (meters)
    Epsg5070,
    /// California Albers (meters)
    Epsg3310,
    /// Any other geographic EPSG code (degrees), e.g. ETRS89.
    OtherGeographic(u32),
    /// Any other EPSG code, treated as projected in meters.
    Other(u32),
}

impl CrsCode {
    /// Map a numeric EPSG code. Unlisted codes in the EPSG geographic 2D
    /// block (4000-4999) are geographic, everything else is projected.
    pub fn from_epsg(code: u32) -> Self {
        match code {
            4326 => CrsCode::Epsg4326,
            4269 => CrsCode::Epsg4269,
            3857 | 900913 => CrsCode::Epsg3857,
            5070 => CrsCode::Epsg5070,
            3310 => CrsCode::Epsg3310,
            4000..=4999 => CrsCode::OtherGeographic(code),
            other => CrsCode::Other(other),
        }
    }

    /// Map a code already known to name a geographic CRS, e.g. from
    /// `GeographicTypeGeoKey`.
    pub fn geographic(code: u32) -> Self {
        match Self::from_epsg(code) {
            crs if crs.is_geographic() => crs,
            _ => CrsCode::OtherGeographic(code),
        }
    }

    /// Parse strings such as `"EPSG:4326"`, `"epsg:5070"` or `"CRS:84"`.
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        if normalized == "CRS:84" {
            return Ok(CrsCode::Epsg4326);
        }

        let code = normalized
            .strip_prefix("EPSG:")
            .ok_or_else(|| CrsParseError::UnsupportedCrs(s.to_string()))?;

        code.parse::<u32>()
            .map(Self::from_epsg)
            .map_err(|_| CrsParseError::UnsupportedCrs(s.to_string()))
    }

    /// Numeric EPSG code.
    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg4269 => 4269,
            CrsCode::Epsg3857 => 3857,
            CrsCode::Epsg5070 => 5070,
            CrsCode::Epsg3310 => 3310,
            CrsCode::OtherGeographic(code) | CrsCode::Other(code) => *code,
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(
            self,
            CrsCode::Epsg4326 | CrsCode::Epsg4269 | CrsCode::OtherGeographic(_)
        )
    }

    /// Check if this is spherical Web Mercator.
    pub fn is_web_mercator(&self) -> bool {
        matches!(self, CrsCode::Epsg3857)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}
