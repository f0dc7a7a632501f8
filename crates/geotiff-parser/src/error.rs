//! Error types for GeoTIFF reading and writing.

use thiserror::Error;

/// Result type for GeoTIFF operations.
pub type GeoTiffResult<T> = Result<T, GeoTiffError>;

/// Errors that can occur when working with GeoTIFF files.
#[derive(Debug, Error)]
pub enum GeoTiffError {
    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding or encoding error.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// Missing or malformed georeferencing tags.
    #[error("Invalid GeoTIFF: {0}")]
    InvalidGeoTiff(String),

    /// Multi-band, palette or otherwise unsupported raster layout.
    #[error("Unsupported raster layout: {0}")]
    UnsupportedLayout(String),
}
