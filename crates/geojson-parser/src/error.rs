//! Error types for GeoJSON loading.

use thiserror::Error;

/// Result type for GeoJSON operations.
pub type GeoJsonResult<T> = Result<T, GeoJsonError>;

#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid GeoJSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required attribute is absent or null.
    #[error("Feature {feature} has no '{property}' property")]
    MissingProperty { feature: usize, property: String },

    /// An attribute is present but has the wrong type or format.
    #[error("Feature {feature} has an invalid '{property}' value: {value}")]
    InvalidProperty {
        feature: usize,
        property: String,
        value: String,
    },

    #[error("Feature {feature}: unsupported geometry type {kind}")]
    UnsupportedGeometry { feature: usize, kind: String },

    #[error("Feature {feature}: {message}")]
    InvalidGeometry { feature: usize, message: String },

    #[error("Duplicate region key '{0}'")]
    DuplicateKey(String),
}
