//! The finished artifact handed back to the message bus when a clip closes.

use crate::geometry::BoundingBox;

/// One motion observation folded into the payload's log, for post-hoc review.
#[derive(Debug, Clone)]
pub struct MotionLogEntry {
    pub pts: i64,
    pub score: f64,
}

/// The payload assembled for one recorded clip.
///
/// Created (mostly empty) on `clip_start`, filled in incrementally as
/// motion events arrive, and finalized on `clip_end`. `initiated` and
/// `ready` are bookkeeping for the episode state machine, not part of the
/// artifact that is actually emitted to the bus.
#[derive(Debug, Clone)]
pub struct Payload {
    pub file_name: String,
    pub motion_time: i64,
    pub ts_delta: i64,
    pub union_box_relative: BoundingBox,
    pub object_boxes_relative: Vec<BoundingBox>,
    pub cropped_box: BoundingBox,
    pub motion_log: Vec<MotionLogEntry>,
    pub delivery_detected: bool,
    pub detection_json: Option<String>,
    pub initiated: bool,
    pub ready: bool,
}

impl Payload {
    /// A payload reset to the state it has immediately after `clip_start`.
    pub fn started(file_name: String) -> Self {
        Self {
            file_name,
            motion_time: 0,
            ts_delta: 0,
            union_box_relative: BoundingBox::default(),
            object_boxes_relative: Vec::new(),
            cropped_box: BoundingBox::default(),
            motion_log: Vec::new(),
            delivery_detected: false,
            detection_json: None,
            initiated: true,
            ready: false,
        }
    }

    pub fn idle() -> Self {
        Self {
            file_name: String::new(),
            motion_time: 0,
            ts_delta: 0,
            union_box_relative: BoundingBox::default(),
            object_boxes_relative: Vec::new(),
            cropped_box: BoundingBox::default(),
            motion_log: Vec::new(),
            delivery_detected: false,
            detection_json: None,
            initiated: false,
            ready: false,
        }
    }
}
