//! Wire shapes for the inbound `CAPTURE` / `METADATA` / `CLIP.STATUS`
//! messages and the outbound `STATUS` message (§4.11, §6), plus the
//! envelope (`{"topic": ..., "payload": ...}`) the opaque bus transport
//! carries underneath them.

use serde::{Deserialize, Serialize};

use camwatch_models::{BoundingBox, MotionEvent, MotionFlags};

use crate::error::{BusError, BusResult};

/// `clipStatus` value meaning "clip recording started".
pub const CLIP_STATUS_START: i32 = 0;
/// `clipStatus` value meaning "clip recording ended".
pub const CLIP_STATUS_END: i32 = 1;

#[derive(Debug, Deserialize)]
struct Envelope {
    topic: String,
    payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct OutEnvelope<'a, T> {
    topic: &'a str,
    payload: T,
}

#[derive(Debug, Deserialize)]
struct WireBoundingBox {
    #[serde(rename = "X")]
    x: i32,
    #[serde(rename = "Y")]
    y: i32,
    #[serde(rename = "W")]
    w: i32,
    #[serde(rename = "H")]
    h: i32,
}

impl From<WireBoundingBox> for BoundingBox {
    fn from(b: WireBoundingBox) -> Self {
        BoundingBox::new(b.x, b.y, b.w, b.h)
    }
}

#[derive(Debug, Deserialize)]
struct CaptureWire {
    #[serde(rename = "processID")]
    process_id: i32,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct MetadataWire {
    timestamp: i64,
    event_type: i32,
    #[serde(rename = "motionScore")]
    motion_score: f64,
    #[serde(rename = "currentTime")]
    current_time: i64,
    #[serde(rename = "boundingBox")]
    bounding_box: WireBoundingBox,
    #[serde(rename = "d_boundingBox")]
    delivery_bounding_box: Option<WireBoundingBox>,
    #[serde(rename = "objectBoxs")]
    object_boxes: Vec<WireBoundingBox>,
    #[serde(rename = "motionFlags")]
    motion_flags: i32,
}

#[derive(Debug, Deserialize)]
struct ClipStatusWire {
    #[serde(rename = "clipStatus")]
    clip_status: i32,
    clipname: String,
}

#[derive(Debug, Serialize)]
struct StatusWire {
    status: String,
}

/// A decoded inbound message, ready to be folded into a [`camwatch_episode::EpisodeController`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum BusMessage {
    /// `CAPTURE`: `process_id` is carried for logging only; the actual
    /// frame (and its own `pts`) comes from the frame source, not this
    /// message.
    Capture { process_id: i32, pts: i64 },
    /// `METADATA`, already folded into the domain [`MotionEvent`]/[`MotionFlags`] pair.
    Metadata { event: MotionEvent, flags: MotionFlags },
    /// `CLIP.STATUS` with `clipStatus == 0`.
    ClipStart(String),
    /// `CLIP.STATUS` with `clipStatus == 1`.
    ClipEnd(String),
    /// `CLIP.STATUS` with any other `clipStatus` value — logged and ignored.
    ClipIgnored(i32),
}

/// Decode one raw bus message into a [`BusMessage`]. Unknown topics and
/// malformed payloads are both reported as [`BusError::Decode`] /
/// [`BusError::UnknownTopic`] — both transient, per the crate's error policy.
pub fn decode_message(bytes: &[u8]) -> BusResult<BusMessage> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    match envelope.topic.as_str() {
        "CAPTURE" => {
            let wire: CaptureWire = serde_json::from_value(envelope.payload)?;
            let pts = wire
                .timestamp
                .trim()
                .parse::<i64>()
                .map_err(|_| BusError::BadNumber(wire.timestamp.clone()))?;
            Ok(BusMessage::Capture { process_id: wire.process_id, pts })
        }
        "METADATA" => {
            let wire: MetadataWire = serde_json::from_value(envelope.payload)?;
            let union_box: BoundingBox = wire.bounding_box.into();
            // Ground truth zeroes this field at construction (memset) and only
            // overwrites it when `d_boundingBox` is actually present on the
            // wire — it is never defaulted from `unionBox`. Zero, not
            // `BoundingBox::default()` (the `-1` invalid sentinel), so
            // `is_empty()` sees it and the plain-resize path is taken.
            let delivery_union_box = wire
                .delivery_bounding_box
                .map(BoundingBox::from)
                .unwrap_or(BoundingBox::new(0, 0, 0, 0));
            let object_boxes = wire.object_boxes.into_iter().map(BoundingBox::from).collect();
            let event = MotionEvent {
                pts: wire.timestamp,
                kind: wire.event_type,
                score: wire.motion_score,
                event_time: wire.current_time,
                union_box,
                delivery_union_box,
                object_boxes,
            };
            let flags = MotionFlags::new(wire.motion_flags as u8);
            Ok(BusMessage::Metadata { event, flags })
        }
        "CLIP.STATUS" => {
            let wire: ClipStatusWire = serde_json::from_value(envelope.payload)?;
            match wire.clip_status {
                CLIP_STATUS_START => Ok(BusMessage::ClipStart(wire.clipname)),
                CLIP_STATUS_END => Ok(BusMessage::ClipEnd(wire.clipname)),
                other => Ok(BusMessage::ClipIgnored(other)),
            }
        }
        other => Err(BusError::UnknownTopic(other.to_string())),
    }
}

/// Encode the outbound `STATUS` message, emitted at boot (`"start"`) and
/// shutdown (`"stop"`).
pub fn encode_status(status: &str) -> Vec<u8> {
    let envelope = OutEnvelope {
        topic: "STATUS",
        payload: StatusWire { status: status.to_string() },
    };
    serde_json::to_vec(&envelope).expect("STATUS envelope is always serializable")
}
