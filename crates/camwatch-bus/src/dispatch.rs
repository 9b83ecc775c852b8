//! Maps a decoded [`BusMessage`] onto the matching [`EpisodeController`]
//! call (§4.11). Owns no transport or retry policy of its own — the main
//! dispatch loop (process bootstrap) decides what to do with a [`BusError`]
//! it gets back (§7: sleep 1s and retry on a malformed message).

use camwatch_episode::{EpisodeController, FrameSource};
use camwatch_models::Payload;
use tracing::warn;

use crate::error::BusResult;
use crate::messages::{decode_message, BusMessage};

/// Decode one raw message and apply it to `controller`. Returns the
/// finalized [`Payload`] when the message was a `clip_end` that produced
/// one; `None` for every other message, including a `clip_end` that
/// produced nothing (no motion this clip, or within the quiet interval).
///
/// A missing raw frame on `capture` is a transient, per-event failure
/// (§7) and is logged here rather than bubbled up as a [`BusError`] — only
/// decode failures propagate, since those are what the caller's retry-sleep
/// policy is for.
pub fn dispatch<F: FrameSource>(controller: &EpisodeController<F>, bytes: &[u8]) -> BusResult<Option<Payload>> {
    match decode_message(bytes)? {
        BusMessage::Capture { process_id, pts } => {
            if let Err(e) = controller.capture() {
                warn!(process_id, pts, error = %e, "capture failed, skipping event");
            }
            Ok(None)
        }
        BusMessage::Metadata { event, flags } => {
            controller.motion_event(event, flags);
            Ok(None)
        }
        BusMessage::ClipStart(name) => {
            controller.clip_start(&name);
            Ok(None)
        }
        BusMessage::ClipEnd(name) => Ok(controller.clip_end(&name)),
        BusMessage::ClipIgnored(status) => {
            warn!(status, "unrecognized clip status, ignoring");
            Ok(None)
        }
    }
}
