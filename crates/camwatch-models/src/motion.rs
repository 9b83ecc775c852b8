//! Motion metadata events arriving from the external motion-detection stage.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// `event_type` value meaning "motion detected". Every other value is
/// reported but does not drive frame selection.
pub const MOTION_DETECTED_KIND: i32 = 4;

/// Maximum number of individual motion blobs carried on one event.
pub const MAX_OBJECT_BOXES: usize = 5;

/// Spatial-gate bits packed into a single field by the upstream bus message.
///
/// `b3` = has ROI, `b2` = inside ROI, `b1` = has DOI, `b0` = inside DOI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionFlags(pub u8);

impl MotionFlags {
    pub fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub fn has_roi(&self) -> bool {
        self.0 & 0b1000 != 0
    }

    pub fn inside_roi(&self) -> bool {
        self.0 & 0b0100 != 0
    }

    pub fn has_doi(&self) -> bool {
        self.0 & 0b0010 != 0
    }

    pub fn inside_doi(&self) -> bool {
        self.0 & 0b0001 != 0
    }

    /// The frame-selection spatial gate: accept when inside whichever of
    /// ROI/DOI is configured, or freely when neither is configured.
    pub fn passes_spatial_gate(&self) -> bool {
        (self.has_roi() && self.inside_roi())
            || (self.has_doi() && self.inside_doi())
            || (!self.has_roi() && !self.has_doi())
    }
}

/// One motion-metadata event.
///
/// `object_boxes` are the individual motion blobs whose union equals
/// `union_box`; at most [`MAX_OBJECT_BOXES`] are carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionEvent {
    pub pts: i64,
    pub kind: i32,
    pub score: f64,
    pub event_time: i64,
    pub union_box: BoundingBox,
    pub delivery_union_box: BoundingBox,
    pub object_boxes: Vec<BoundingBox>,
}

impl MotionEvent {
    pub fn is_motion_detected(&self) -> bool {
        self.kind == MOTION_DETECTED_KIND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_gate_configured_passes_freely() {
        assert!(MotionFlags::new(0b0000).passes_spatial_gate());
    }

    #[test]
    fn roi_configured_and_outside_is_rejected() {
        assert!(!MotionFlags::new(0b1000).passes_spatial_gate());
    }

    #[test]
    fn roi_configured_and_inside_passes() {
        assert!(MotionFlags::new(0b1100).passes_spatial_gate());
    }

    #[test]
    fn doi_configured_and_inside_passes() {
        assert!(MotionFlags::new(0b0011).passes_spatial_gate());
    }

    #[test]
    fn motion_detected_kind_matches_constant() {
        let e = MotionEvent {
            pts: 0,
            kind: MOTION_DETECTED_KIND,
            score: 0.0,
            event_time: 0,
            union_box: BoundingBox::default(),
            delivery_union_box: BoundingBox::default(),
            object_boxes: vec![],
        };
        assert!(e.is_motion_detected());
    }
}
