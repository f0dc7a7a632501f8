//! Error types for rendering.

use thiserror::Error;

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Values and region geometries do not line up one to one.
    #[error("Join error: {0}")]
    Join(String),

    /// Unknown palette, malformed colour or unusable map settings.
    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}
