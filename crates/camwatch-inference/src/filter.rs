//! Geometric filtering of detector output against the motion blobs and the
//! optional ROI polygon.

use camwatch_models::{BoundingBox, BoxPrediction, NormalizedBox, Roi};

/// `true` iff `pred`'s normalized box lies entirely within `bbox`.
///
/// `bbox` is an absolute-pixel [`BoundingBox`]; it is normalized against
/// `(frame_w, frame_h)` before comparison so both operands share a frame of
/// reference.
pub fn inside_box(pred: &BoxPrediction, bbox: &BoundingBox, frame_w: u32, frame_h: u32) -> bool {
    if frame_w == 0 || frame_h == 0 || bbox.is_empty() {
        return false;
    }
    let norm = NormalizedBox::new(
        bbox.x as f32 / frame_w as f32,
        bbox.y as f32 / frame_h as f32,
        (bbox.x + bbox.w) as f32 / frame_w as f32,
        (bbox.y + bbox.h) as f32 / frame_h as f32,
    );
    inside_normalized_box(pred, &norm)
}

/// `inside_box`, but for a motion object-box already normalized against the
/// frame it was captured in (the form [`camwatch_models::ClassificationFrame`]
/// carries its boxes in).
pub fn inside_normalized_box(pred: &BoxPrediction, norm: &NormalizedBox) -> bool {
    pred.x_min >= norm.x_min
        && pred.y_min >= norm.y_min
        && pred.x_max <= norm.x_max
        && pred.y_max <= norm.y_max
}

/// `true` iff `pred`'s box falls inside `roi`. An empty ROI accepts
/// everything. Otherwise, ray-casting point-in-polygon is run on each of the
/// prediction's four corners; any corner inside the polygon accepts the box.
pub fn inside_roi(pred: &BoxPrediction, roi: &Roi) -> bool {
    if roi.is_empty() {
        return true;
    }
    let corners = [
        (pred.x_min, pred.y_min),
        (pred.x_max, pred.y_min),
        (pred.x_min, pred.y_max),
        (pred.x_max, pred.y_max),
    ];
    corners.iter().any(|&(x, y)| point_in_polygon(x, y, roi))
}

fn point_in_polygon(x: f32, y: f32, roi: &Roi) -> bool {
    let points = &roi.0;
    let n = points.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &points[i];
        let pj = &points[j];
        let crosses = (pi.y > y) != (pj.y > y);
        if crosses {
            let x_intersect = (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x;
            if x < x_intersect {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// The first prediction inside any of `object_boxes` and inside `roi`, if
/// any. Predictions are assumed already sorted score-descending by the
/// model's own post-processing; the first match is therefore the
/// highest-confidence admissible one.
pub fn process(
    preds: &[BoxPrediction],
    object_boxes: &[BoundingBox],
    roi: &Roi,
    frame_w: u32,
    frame_h: u32,
) -> Option<BoxPrediction> {
    preds
        .iter()
        .find(|pred| {
            object_boxes
                .iter()
                .any(|b| inside_box(pred, b, frame_w, frame_h))
                && inside_roi(pred, roi)
        })
        .copied()
}

/// `process`, for object boxes already normalized (the classifier worker's
/// per-iteration frame carries them this way).
pub fn process_normalized(
    preds: &[BoxPrediction],
    object_boxes: &[NormalizedBox],
    roi: &Roi,
) -> Option<BoxPrediction> {
    preds
        .iter()
        .find(|pred| {
            object_boxes.iter().any(|b| inside_normalized_box(pred, b)) && inside_roi(pred, roi)
        })
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use camwatch_models::{DetectionClass, Point};

    fn pred(x_min: f32, y_min: f32, x_max: f32, y_max: f32, confidence: f32) -> BoxPrediction {
        BoxPrediction {
            y_min,
            x_min,
            y_max,
            x_max,
            confidence,
            class: DetectionClass::Person,
        }
    }

    #[test]
    fn inside_box_accepts_fully_contained_prediction() {
        let bbox = BoundingBox::new(100, 100, 200, 200);
        let p = pred(0.2, 0.2, 0.4, 0.4);
        assert!(inside_box(&p, &bbox, 1000, 1000));
    }

    #[test]
    fn inside_box_rejects_prediction_spilling_outside() {
        let bbox = BoundingBox::new(100, 100, 200, 200);
        let p = pred(0.05, 0.05, 0.4, 0.4);
        assert!(!inside_box(&p, &bbox, 1000, 1000));
    }

    #[test]
    fn inside_roi_with_empty_polygon_accepts_everything() {
        let p = pred(0.0, 0.0, 1.0, 1.0);
        assert!(inside_roi(&p, &Roi::empty()));
    }

    #[test]
    fn inside_roi_ray_casting_rejects_outside_square() {
        let square = Roi(vec![
            Point::new(0.2, 0.2),
            Point::new(0.4, 0.2),
            Point::new(0.4, 0.4),
            Point::new(0.2, 0.4),
        ]);
        let outside = pred(0.6, 0.6, 0.8, 0.8);
        assert!(!inside_roi(&outside, &square));
        let inside = pred(0.25, 0.25, 0.3, 0.3);
        assert!(inside_roi(&inside, &square));
    }

    #[test]
    fn process_returns_first_admissible_prediction_in_score_order() {
        let object_boxes = vec![BoundingBox::new(0, 0, 1000, 1000)];
        let roi = Roi::empty();
        let preds = vec![pred(0.1, 0.1, 0.2, 0.2, 0.9), pred(0.3, 0.3, 0.4, 0.4, 0.7)];
        let chosen = process(&preds, &object_boxes, &roi, 1000, 1000).unwrap();
        assert_eq!(chosen.confidence, 0.9);
    }

    #[test]
    fn process_returns_none_when_nothing_matches() {
        let object_boxes = vec![BoundingBox::new(900, 900, 10, 10)];
        let roi = Roi::empty();
        let preds = vec![pred(0.1, 0.1, 0.2, 0.2, 0.9)];
        assert!(process(&preds, &object_boxes, &roi, 1000, 1000).is_none());
    }

    #[test]
    fn process_normalized_matches_already_normalized_object_boxes() {
        let object_boxes = vec![NormalizedBox::new(0.0, 0.0, 1.0, 1.0)];
        let roi = Roi::empty();
        let preds = vec![pred(0.1, 0.1, 0.2, 0.2, 0.9)];
        assert!(process_normalized(&preds, &object_boxes, &roi).is_some());
    }
}
