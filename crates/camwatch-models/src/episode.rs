//! The two frame caches held by the episode controller while a clip is open.

use crate::frame::Nv12Frame;
use crate::geometry::{BoundingBox, NormalizedBox};
use crate::motion::MotionEvent;

/// The thumbnail candidate: the frame the selection policy currently prefers.
///
/// At most one is live at a time; it is replaced wholesale, never appended to.
#[derive(Debug, Clone)]
pub struct EpisodeFrame {
    pub nv12: Nv12Frame,
    pub event: MotionEvent,
    pub captured: bool,
    pub cached: bool,
}

impl EpisodeFrame {
    /// The union-box area of the currently-held frame, or `0` if none is cached yet.
    pub fn union_area(&self) -> i64 {
        if self.cached {
            self.event.union_box.area()
        } else {
            0
        }
    }
}

/// The frame handed to the classifier worker. Overwritten every time
/// `classify_now` is raised by the controller.
#[derive(Debug, Clone)]
pub struct ClassificationFrame {
    pub nv12: Nv12Frame,
    pub delivery_union_box: BoundingBox,
    pub object_boxes: Vec<NormalizedBox>,
    pub cached: bool,
}

impl ClassificationFrame {
    pub fn empty(pts: i64) -> Self {
        Self {
            nv12: Nv12Frame::new(Vec::new(), Vec::new(), 0, 0, pts),
            delivery_union_box: BoundingBox::default(),
            object_boxes: Vec::new(),
            cached: false,
        }
    }
}
