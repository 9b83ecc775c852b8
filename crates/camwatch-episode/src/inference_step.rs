//! The person-inference step (§4.4) and delivery cascade (§4.5) the
//! classifier worker runs once per iteration.

use camwatch_inference::{process_normalized, ModelRunner, TopKBuffer};
use camwatch_models::{ClassificationFrame, Roi, TopKEntry};
use camwatch_vision::convert_and_resize;
use tracing::{debug, warn};

/// Confidence above which a person detection is worth cascading into the
/// delivery model.
pub const PERSON_THRESHOLD: f32 = 0.60;
/// Confidence above which the delivery model's top candidate marks the
/// payload `delivery_detected`.
pub const DELIVERY_THRESHOLD: f32 = 0.87;

/// One classifier-worker iteration: build the person-detector tensor, run
/// it, filter against the frame's motion boxes, and (if confident enough)
/// push a delivery-candidate tensor into `top_k`. Any failure is logged and
/// treated as "no detection this iteration" — inference failures are
/// transient and must not stop the worker.
pub fn run_person_inference(person: &dyn ModelRunner, frame: &ClassificationFrame, top_k: &mut TopKBuffer) {
    let format = person.tensor_format();
    let (tensor, _scaling) = match convert_and_resize(&frame.nv12, &format, Some(&frame.delivery_union_box)) {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "person tensor build failed, skipping iteration");
            return;
        }
    };

    let predictions = match person.run(&tensor) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "person inference failed, skipping iteration");
            return;
        }
    };

    let roi = Roi::empty();
    let chosen = match process_normalized(&predictions, &frame.object_boxes, &roi) {
        Some(p) => p,
        None => return,
    };

    if chosen.confidence < PERSON_THRESHOLD {
        debug!(confidence = chosen.confidence, "person confidence below threshold");
        return;
    }

    let delivery_tensor = match convert_and_resize(&frame.nv12, &format, Some(&frame.delivery_union_box)) {
        Ok((t, _)) => t,
        Err(e) => {
            warn!(error = %e, "delivery-candidate tensor build failed");
            return;
        }
    };
    top_k.add(TopKEntry::new(delivery_tensor, chosen.confidence));
}

/// The delivery cascade (§4.5): run the delivery model over every entry in
/// `top_k` and report whether the highest-scored candidate clears
/// [`DELIVERY_THRESHOLD`]. Returns `false` (without error) on an empty
/// buffer or if every run fails.
pub fn run_delivery_cascade(delivery: &dyn ModelRunner, top_k: &mut TopKBuffer) -> bool {
    let entries = top_k.snapshot();

    for entry in entries {
        match delivery.run(&entry.tensor) {
            Ok(predictions) => {
                if let Some(top) = predictions.first() {
                    if top.confidence >= DELIVERY_THRESHOLD {
                        return true;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "delivery inference failed, skipping candidate");
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use camwatch_inference::MockModelRunner;
    use camwatch_models::{BoundingBox, DetectionClass, BoxPrediction, Nv12Frame, TensorFormat};

    fn flat_frame(w: u32, h: u32) -> Nv12Frame {
        Nv12Frame::new(vec![128u8; (w * h) as usize], vec![128u8; (w * h / 2) as usize], w, h, 0)
    }

    fn classification_frame() -> ClassificationFrame {
        ClassificationFrame {
            nv12: flat_frame(640, 480),
            delivery_union_box: BoundingBox::new(100, 100, 200, 150),
            object_boxes: vec![camwatch_models::NormalizedBox::new(0.0, 0.0, 1.0, 1.0)],
            cached: true,
        }
    }

    #[test]
    fn run_person_inference_pushes_to_top_k_above_threshold() {
        let mut runner = MockModelRunner::new(vec![BoxPrediction {
            y_min: 0.1,
            x_min: 0.1,
            y_max: 0.2,
            x_max: 0.2,
            confidence: 0.75,
            class: DetectionClass::Person,
        }])
        .with_tensor_format(TensorFormat::symmetric_u8(300, 300));
        runner.init().unwrap();

        let mut top_k = TopKBuffer::new();
        run_person_inference(&runner, &classification_frame(), &mut top_k);
        assert_eq!(top_k.len(), 1);
    }

    #[test]
    fn run_person_inference_skips_below_threshold() {
        let mut runner = MockModelRunner::new(vec![BoxPrediction {
            y_min: 0.1,
            x_min: 0.1,
            y_max: 0.2,
            x_max: 0.2,
            confidence: 0.3,
            class: DetectionClass::Person,
        }])
        .with_tensor_format(TensorFormat::symmetric_u8(300, 300));
        runner.init().unwrap();

        let mut top_k = TopKBuffer::new();
        run_person_inference(&runner, &classification_frame(), &mut top_k);
        assert!(top_k.is_empty());
    }

    #[test]
    fn run_delivery_cascade_detects_above_threshold() {
        let mut runner = MockModelRunner::new(vec![BoxPrediction {
            y_min: 0.0,
            x_min: 0.0,
            y_max: 0.1,
            x_max: 0.1,
            confidence: 0.9,
            class: DetectionClass::Delivery,
        }]);
        runner.init().unwrap();
        let mut top_k = TopKBuffer::new();
        top_k.add(TopKEntry::new(vec![1, 2, 3], 0.75));
        assert!(run_delivery_cascade(&runner, &mut top_k));
    }

    #[test]
    fn run_delivery_cascade_is_false_on_empty_buffer() {
        let mut runner = MockModelRunner::new(vec![]);
        runner.init().unwrap();
        let mut top_k = TopKBuffer::new();
        assert!(!run_delivery_cascade(&runner, &mut top_k));
    }
}
