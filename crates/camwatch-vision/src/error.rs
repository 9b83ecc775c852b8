//! Error types for the image transform kernel.

use thiserror::Error;

pub type VisionResult<T> = Result<T, VisionError>;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("NV12 buffer too small: expected at least {expected} bytes, got {got}")]
    BufferTooSmall { expected: usize, got: usize },

    #[error("sub-pixel rectangle extraction failed: {0}")]
    SubPixelExtraction(String),

    #[error("empty raw frame")]
    EmptyFrame,

    #[error("image encode failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
