//! Error types for the editor core.

use thiserror::Error;

/// Errors surfaced to the host.
#[derive(Error, Debug)]
pub enum EditorError {
    /// The source raster could not be decoded
    #[error("failed to open editing session: {0}")]
    OpenSessionFailed(#[source] image::ImageError),

    /// A session-bound call was made with no open session
    #[error("no active editing session")]
    NoActiveSession,

    /// The output raster could not be composed
    #[error("failed to composite output: {0}")]
    Composite(String),

    /// The output raster could not be encoded
    #[error("failed to encode output: {0}")]
    Encode(#[source] image::ImageError),
}

/// Errors recovered locally by the geometry and sampling code.
///
/// These never reach the host; callers log them and fall back to a safe default.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionError {
    /// Crop or redaction rectangle has no area after clamping
    #[error("region has no area after clamping")]
    InvalidRegion,

    /// Sampling addressed a pixel outside the raster
    #[error("sample ({x}, {y}) is outside a {width}x{height} raster")]
    SampleOutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
}

pub type Result<T> = std::result::Result<T, EditorError>;
