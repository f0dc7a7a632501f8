//! Error types for the suitability pipeline.

use thiserror::Error;

/// Result type alias using SuitabilityError.
pub type SuitabilityResult<T> = Result<T, SuitabilityError>;

/// Every failure aborts the run; inputs are static files so nothing is retried.
#[derive(Debug, Error)]
pub enum SuitabilityError {
    /// Missing or unreadable input file.
    #[error("Failed to load {path}: {message}")]
    InputLoad { path: String, message: String },

    /// Grids that cannot be brought onto a common grid.
    #[error("Alignment failed: {0}")]
    Alignment(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Region keys disagree between two datasets.
    #[error("Region join failed: {0}")]
    Join(String),

    /// Suitable area larger than the region's own area.
    #[error(
        "Suitable area {suitable_km2:.3} km2 exceeds total area {total_km2:.3} km2 for region '{key}'"
    )]
    AreaMismatch {
        key: String,
        suitable_km2: f64,
        total_km2: f64,
    },

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SuitabilityError {
    /// Create an InputLoad error.
    pub fn input_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an Alignment error.
    pub fn alignment(msg: impl Into<String>) -> Self {
        Self::Alignment(msg.into())
    }

    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a Join error.
    pub fn join(msg: impl Into<String>) -> Self {
        Self::Join(msg.into())
    }
}
