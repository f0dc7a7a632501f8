//! Configuration for raster alignment.

use crate::types::ResampleMethod;
use grid_common::TemperatureUnit;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How temperature and depth grids are brought onto a common grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Method used to resample the depth grid onto the temperature grid.
    pub resample: ResampleMethod,

    /// Unit the temperature rasters are stored in.
    pub temperature_unit: TemperatureUnit,
}

impl AlignConfig {
    /// Apply `SUITABILITY_RESAMPLE` and `SUITABILITY_TEMPERATURE_UNIT`
    /// on top of this configuration. Unrecognised values are logged and
    /// leave the setting unchanged.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("SUITABILITY_RESAMPLE") {
            match ResampleMethod::parse(&val) {
                Some(method) => self.resample = method,
                None => warn!(
                    value = %val,
                    keeping = %self.resample,
                    "Ignoring unknown SUITABILITY_RESAMPLE"
                ),
            }
        }

        if let Ok(val) = std::env::var("SUITABILITY_TEMPERATURE_UNIT") {
            match TemperatureUnit::parse(&val) {
                Some(unit) => self.temperature_unit = unit,
                None => warn!(
                    value = %val,
                    keeping = ?self.temperature_unit,
                    "Ignoring unknown SUITABILITY_TEMPERATURE_UNIT"
                ),
            }
        }

        self
    }
}
