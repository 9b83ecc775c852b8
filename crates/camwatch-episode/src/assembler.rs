//! Payload assembler (C8): turns the thumbnail candidate frame into the
//! on-disk JPEG and the finished, thumbnail-relative [`Payload`].

use camwatch_geom::relative_box;
use camwatch_models::{BoundingBox, EpisodeFrame, Payload};
use camwatch_vision::{resize_frame, write_jpeg, yuv_to_rgb};
use tracing::warn;

use crate::error::EpisodeResult;

pub const THUMBNAIL_WIDTH: i32 = 400;
pub const THUMBNAIL_HEIGHT: i32 = 300;

/// Finalize `payload` using the frame the selection policy settled on.
/// Writes the JPEG to `payload.file_name` and rewrites every box field in
/// thumbnail-relative coordinates. Transient failures (sub-pixel extraction,
/// JPEG write) are logged and leave the payload's box fields at their
/// identity defaults rather than aborting the clip.
pub fn finalize(payload: Payload, frame: &EpisodeFrame, quality: u8) -> EpisodeResult<Payload> {
    finalize_with_debug_dump(payload, frame, quality, None)
}

/// `finalize`, additionally invoking `debug_dump` (the `/tmp/.store` debug
/// switch, §6) with `("raw", ...)` and `("transformed", ...)` once each, if
/// a dump sink is supplied. The sink itself decides whether the debug
/// switch is actually on; this function always offers both buffers.
pub fn finalize_with_debug_dump(
    mut payload: Payload,
    frame: &EpisodeFrame,
    quality: u8,
    debug_dump: Option<&dyn Fn(&str, &[u8], u32, u32)>,
) -> EpisodeResult<Payload> {
    let rgb = yuv_to_rgb(&frame.nv12)?;
    if let Some(dump) = debug_dump {
        dump("raw", &rgb, frame.nv12.w, frame.nv12.h);
    }
    let union_box = frame.event.union_box;
    let (thumb_rgb, scaling) = resize_frame(
        &rgb,
        frame.nv12.w,
        frame.nv12.h,
        THUMBNAIL_WIDTH,
        THUMBNAIL_HEIGHT,
        Some(&union_box),
    )?;
    if let Some(dump) = debug_dump {
        dump("transformed", &thumb_rgb, THUMBNAIL_WIDTH as u32, THUMBNAIL_HEIGHT as u32);
    }

    if let Err(e) = write_jpeg(&payload.file_name, &thumb_rgb, THUMBNAIL_WIDTH as u32, THUMBNAIL_HEIGHT as u32, quality) {
        warn!(file = %payload.file_name, error = %e, "failed to write thumbnail jpeg");
    }

    let to_relative = |b: &BoundingBox| -> BoundingBox {
        let scaled = b.scale_down(scaling.scale_factor);
        relative_box(&scaled, scaling.crop_size, scaling.crop_center)
    };

    payload.union_box_relative = to_relative(&union_box);
    payload.object_boxes_relative = frame.event.object_boxes.iter().map(to_relative).collect();

    let (cx, cy) = scaling.crop_center;
    let (cw, ch) = scaling.crop_size;
    payload.cropped_box = BoundingBox::new(
        (cx - cw as f32 / 2.0).round() as i32,
        (cy - ch as f32 / 2.0).round() as i32,
        cw,
        ch,
    );
    payload.motion_time = frame.event.event_time;
    payload.ts_delta = frame.event.pts - frame.event.event_time;
    payload.ready = true;

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camwatch_models::{MotionEvent, Nv12Frame};

    fn flat_frame(w: u32, h: u32) -> Nv12Frame {
        Nv12Frame::new(vec![128u8; (w * h) as usize], vec![128u8; (w * h / 2) as usize], w, h, 100)
    }

    fn episode_frame() -> EpisodeFrame {
        EpisodeFrame {
            nv12: flat_frame(640, 480),
            event: MotionEvent {
                pts: 100,
                kind: 4,
                score: 0.8,
                event_time: 95,
                union_box: BoundingBox::new(100, 100, 200, 150),
                delivery_union_box: BoundingBox::new(100, 100, 200, 150),
                object_boxes: vec![BoundingBox::new(100, 100, 200, 150)],
            },
            captured: true,
            cached: true,
        }
    }

    #[test]
    fn finalize_marks_payload_ready_and_sets_union_box() {
        let payload = Payload::started("/tmp/nonexistent-test-dir-xyz/c1.jpeg".to_string());
        let frame = episode_frame();
        let result = finalize(payload, &frame, 90).unwrap();
        assert!(result.ready);
        assert_eq!(result.object_boxes_relative.len(), 1);
    }

    #[test]
    fn finalize_keeps_thumbnail_relative_box_within_crop_bounds() {
        let payload = Payload::started("/tmp/nonexistent-test-dir-xyz/c2.jpeg".to_string());
        let frame = episode_frame();
        let result = finalize(payload, &frame, 90).unwrap();
        let b = result.union_box_relative;
        assert!(b.x >= 0 && b.x + b.w <= THUMBNAIL_WIDTH);
        assert!(b.y >= 0 && b.y + b.h <= THUMBNAIL_HEIGHT);
    }
}
