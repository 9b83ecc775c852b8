//! The frame source adapter (C1): a trait boundary in front of whatever
//! camera driver actually produces frames, so tests can substitute a
//! deterministic fixture source.

use camwatch_models::Nv12Frame;

use crate::error::EpisodeError;

/// Blocks until the next raw frame is ready. Non-reentrant: a single
/// subscriber per buffer-id, called only from the main dispatch thread.
/// Frames may be dropped by the underlying source; callers must not assume
/// monotonic `pts` deltas.
pub trait FrameSource: Send {
    fn capture(&self) -> Result<Nv12Frame, EpisodeError>;
}

/// A source backed by a channel, for a production bootstrap that receives
/// frames from an FFI callback or separate capture thread.
pub struct ChannelFrameSource {
    rx: std::sync::mpsc::Receiver<Nv12Frame>,
}

impl ChannelFrameSource {
    pub fn new(rx: std::sync::mpsc::Receiver<Nv12Frame>) -> Self {
        Self { rx }
    }
}

impl FrameSource for ChannelFrameSource {
    fn capture(&self) -> Result<Nv12Frame, EpisodeError> {
        self.rx.recv().map_err(|_| EpisodeError::SourceUnavailable)
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod fixture {
    use super::*;
    use std::sync::Mutex;

    /// A scripted source that replays a fixed list of frames, then reports
    /// `SourceUnavailable` forever.
    pub struct FixtureFrameSource {
        frames: Mutex<std::collections::VecDeque<Nv12Frame>>,
    }

    impl FixtureFrameSource {
        pub fn new(frames: Vec<Nv12Frame>) -> Self {
            Self {
                frames: Mutex::new(frames.into()),
            }
        }
    }

    impl FrameSource for FixtureFrameSource {
        fn capture(&self) -> Result<Nv12Frame, EpisodeError> {
            self.frames
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(EpisodeError::SourceUnavailable)
        }
    }
}
