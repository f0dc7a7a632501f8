//! Physical units used by the pipeline.

use serde::{Deserialize, Serialize};

/// Offset between Kelvin and Celsius.
pub const KELVIN_OFFSET: f32 = 273.15;

/// Unit of a temperature raster as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Kelvin,
    Celsius,
}

impl TemperatureUnit {
    /// Convert a value in this unit to degrees Celsius.
    pub fn to_celsius(self, value: f32) -> f32 {
        match self {
            TemperatureUnit::Kelvin => value - KELVIN_OFFSET,
            TemperatureUnit::Celsius => value,
        }
    }

    /// Parse a unit name (case-insensitive). Unknown names give `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "k" | "kelvin" => Some(TemperatureUnit::Kelvin),
            "c" | "celsius" | "degc" => Some(TemperatureUnit::Celsius),
            _ => None,
        }
    }
}

/// Unit of a cell-area grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    SquareMeters,
    SquareKilometers,
    Hectares,
}

impl AreaUnit {
    /// Convert an area in m² to this unit.
    pub fn from_square_meters(self, m2: f64) -> f64 {
        match self {
            AreaUnit::SquareMeters => m2,
            AreaUnit::SquareKilometers => m2 / 1_000_000.0,
            AreaUnit::Hectares => m2 / 10_000.0,
        }
    }

    /// Short label for reports.
    pub fn label(self) -> &'static str {
        match self {
            AreaUnit::SquareMeters => "m2",
            AreaUnit::SquareKilometers => "km2",
            AreaUnit::Hectares => "ha",
        }
    }
}
