use thiserror::Error;

/// A specialized `Result` type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// The error type for screen sampling and synthetic input.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Point is out of bounds: x={x}, y={y} (screen {width}x{height})")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Capture region is empty: {width}x{height} at ({x}, {y})")]
    EmptyRegion {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Capture source unavailable: {description}")]
    Unavailable { description: String },

    #[error("Input injection failed: {description}")]
    InputFailed { description: String },

    #[error("Failed to decode frame: {source}")]
    Image {
        #[from]
        source: image::ImageError,
    },
}
