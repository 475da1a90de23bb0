//! Error types for the glyph-swarm core.

use thiserror::Error;

/// Errors produced by sketch, sampler, and configuration operations.
#[derive(Debug, Error)]
pub enum SwarmError {
    /// Width or height was zero where a non-empty raster is required, or the
    /// area exceeds [`MAX_CANVAS_PIXELS`](crate::geometry::MAX_CANVAS_PIXELS).
    #[error("invalid dimensions: width and height must be non-zero and within the canvas size limit")]
    InvalidDimensions,

    /// A configuration value failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// The text rasterizer could not produce a coverage mask.
    #[error("raster error: {0}")]
    Raster(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// An I/O failure (snapshot writing, host surface access).
    #[error("I/O error: {0}")]
    Io(String),
}
