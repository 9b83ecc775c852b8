//! Axis-aligned boxes, normalized boxes, and polygons used throughout the pipeline.

use serde::{Deserialize, Serialize};

/// Sentinel used by the upstream bus protocol to mean "no box".
pub const INVALID: i32 = -1;

/// An absolute-pixel-space bounding box.
///
/// `w` and `h` are always `>= 0`; a box is empty iff `w == 0 || h == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl BoundingBox {
    pub const INVALID: BoundingBox = BoundingBox { x: INVALID, y: INVALID, w: INVALID, h: INVALID };

    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        debug_assert!(w >= 0 && h >= 0, "BoundingBox dimensions must be non-negative");
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn is_valid(&self) -> bool {
        self.x != INVALID && self.y != INVALID && self.w != INVALID && self.h != INVALID
    }

    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// Divide every coordinate by `scale`, in place. Used when a source frame
    /// was downscaled before the crop was taken.
    pub fn scale_down(&self, scale: f64) -> Self {
        if scale == 1.0 || scale == 0.0 {
            return *self;
        }
        Self {
            x: (self.x as f64 / scale).round() as i32,
            y: (self.y as f64 / scale).round() as i32,
            w: (self.w as f64 / scale).round() as i32,
            h: (self.h as f64 / scale).round() as i32,
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::INVALID
    }
}

/// A box in `[0, 1]` normalized coordinates, as produced/consumed by detectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl NormalizedBox {
    /// Construct a normalized box, clamping every coordinate into `[0, 1]`.
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min: x_min.clamp(0.0, 1.0),
            y_min: y_min.clamp(0.0, 1.0),
            x_max: x_max.clamp(0.0, 1.0),
            y_max: y_max.clamp(0.0, 1.0),
        }
    }
}

/// A single vertex of an ROI polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A region-of-interest polygon. An empty polygon means "accept all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roi(pub Vec<Point>);

impl Roi {
    pub fn empty() -> Self {
        Roi(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_has_zero_dimension() {
        assert!(BoundingBox::new(0, 0, 0, 10).is_empty());
        assert!(BoundingBox::new(0, 0, 10, 0).is_empty());
        assert!(!BoundingBox::new(0, 0, 10, 10).is_empty());
    }

    #[test]
    fn invalid_sentinel_round_trips() {
        let b = BoundingBox::default();
        assert!(!b.is_valid());
    }

    #[test]
    fn normalized_box_clamps() {
        let b = NormalizedBox::new(-0.5, 1.5, 2.0, -1.0);
        assert_eq!(b.x_min, 0.0);
        assert_eq!(b.y_min, 1.0);
        assert_eq!(b.x_max, 1.0);
        assert_eq!(b.y_max, 0.0);
    }

    #[test]
    fn scale_down_is_identity_at_one() {
        let b = BoundingBox::new(10, 20, 30, 40);
        assert_eq!(b.scale_down(1.0), b);
    }
}
