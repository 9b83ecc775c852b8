//! Error types for the frame source and episode controller.

use thiserror::Error;

pub type EpisodeResult<T> = Result<T, EpisodeError>;

#[derive(Debug, Error)]
pub enum EpisodeError {
    #[error("frame source unavailable")]
    SourceUnavailable,

    #[error("vision pipeline failed: {0}")]
    Vision(#[from] camwatch_vision::VisionError),
}
