//! A single detector output box.

use crate::geometry::NormalizedBox;

/// What a detection was classified as.
///
/// The original C++ source fell through the `delivery` switch case into
/// `unknown`; this reimplementation assigns `Delivery` cleanly instead of
/// reproducing that bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionClass {
    Unknown,
    Person,
    Delivery,
}

/// One bounding box emitted by a detector, in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxPrediction {
    pub y_min: f32,
    pub x_min: f32,
    pub y_max: f32,
    pub x_max: f32,
    pub confidence: f32,
    pub class: DetectionClass,
}

impl BoxPrediction {
    pub fn as_normalized_box(&self) -> NormalizedBox {
        NormalizedBox::new(self.x_min, self.y_min, self.x_max, self.y_max)
    }
}
