//! Core types for grid processing.

use grid_common::{SuitabilityError, SuitabilityResult};
use serde::{Deserialize, Serialize};

/// Method used to sample a source grid at target cell centres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleMethod {
    /// Value of the source cell containing the centre (preserves exact values).
    #[default]
    Nearest,
    /// Interpolated between the four nearest source cell centres.
    Bilinear,
}

impl ResampleMethod {
    /// Parse from string (case-insensitive). Unknown names give `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "nearest" | "near" => Some(Self::Nearest),
            "bilinear" | "linear" => Some(Self::Bilinear),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResampleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
        }
    }
}

/// Inclusive value range a cell must fall in to be suitable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityRange {
    pub low: f64,
    pub high: f64,
}

impl SuitabilityRange {
    /// Create a range, rejecting non-finite bounds and `low > high`.
    pub fn new(low: f64, high: f64) -> SuitabilityResult<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(SuitabilityError::configuration(format!(
                "range bounds must be finite, got [{}, {}]",
                low, high
            )));
        }
        if low > high {
            return Err(SuitabilityError::configuration(format!(
                "range low {} is greater than high {}",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    /// True when `low <= value <= high`. No-data is never contained.
    pub fn contains(&self, value: f32) -> bool {
        let value = value as f64;
        value >= self.low && value <= self.high
    }
}

impl std::fmt::Display for SuitabilityRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}
