//! Shared data model for the motion-triggered thumbnail and classification pipeline.
//!
//! This crate provides plain, serde-friendly types for:
//! - Raw NV12 camera frames
//! - Bounding boxes, normalized boxes, and ROI polygons
//! - Motion-metadata events and their spatial gating flags
//! - The episode controller's frame caches
//! - Detector outputs and top-K buffer entries
//! - The finished clip payload

pub mod episode;
pub mod frame;
pub mod geometry;
pub mod motion;
pub mod prediction;
pub mod payload;
pub mod scaling;
pub mod tensor;
pub mod topk;

pub use episode::{ClassificationFrame, EpisodeFrame};
pub use frame::Nv12Frame;
pub use geometry::{BoundingBox, NormalizedBox, Point, Roi};
pub use motion::{MotionEvent, MotionFlags, MAX_OBJECT_BOXES, MOTION_DETECTED_KIND};
pub use prediction::{BoxPrediction, DetectionClass};
pub use payload::{MotionLogEntry, Payload};
pub use scaling::ScalingResult;
pub use tensor::TensorFormat;
pub use topk::TopKEntry;
