//! The episode controller (C7): the state machine that correlates capture,
//! motion-metadata, and clip-start/clip-end events into one payload per
//! recorded clip, plus the classifier worker scheduling (C4.4-4.5) and the
//! payload assembler (C8) that finishes it.

pub mod assembler;
pub mod controller;
pub mod error;
pub mod source;

#[cfg(feature = "classification")]
pub mod inference_step;

pub use controller::EpisodeController;
pub use error::{EpisodeError, EpisodeResult};
pub use source::{ChannelFrameSource, FrameSource};

#[cfg(any(test, feature = "test-util"))]
pub use source::fixture;
