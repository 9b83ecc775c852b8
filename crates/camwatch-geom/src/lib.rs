//! Pure, deterministic geometry used to pick and size the motion thumbnail.
//!
//! Every function here is side-effect-free: same inputs, same outputs, no
//! I/O. The image transform kernel (`camwatch-vision`) is the only caller
//! that touches pixels; this crate only ever touches coordinates.

use camwatch_models::BoundingBox;

/// The centroid of a bounding box, in the same coordinate space as the box.
pub fn centroid(b: &BoundingBox) -> (f32, f32) {
    (
        b.x as f32 + b.w as f32 / 2.0,
        b.y as f32 + b.h as f32 / 2.0,
    )
}

/// Clamp a `crop_w x crop_h` rectangle centered at `c` so that it lies fully
/// inside `[0, frame_w] x [0, frame_h]`, returning the adjusted center.
///
/// Guaranteed to produce a rectangle inside the frame whenever
/// `crop_w <= frame_w && crop_h <= frame_h`.
pub fn align_centroid(
    c: (f32, f32),
    frame_w: f32,
    frame_h: f32,
    crop_w: f32,
    crop_h: f32,
) -> (f32, f32) {
    let ax = align_axis(c.0, frame_w, crop_w);
    let ay = align_axis(c.1, frame_h, crop_h);
    (ax, ay)
}

fn align_axis(c: f32, frame_extent: f32, crop_extent: f32) -> f32 {
    let s = (c + crop_extent / 2.0) - frame_extent;
    let a = c - s.max(0.0);
    a - (a - crop_extent / 2.0).min(0.0)
}

/// The crop rectangle `align_centroid` implies, for callers that want the
/// actual box rather than just the center.
pub fn aligned_crop_rect(
    c: (f32, f32),
    frame_w: f32,
    frame_h: f32,
    crop_w: f32,
    crop_h: f32,
) -> (f32, f32, f32, f32) {
    let (ax, ay) = align_centroid(c, frame_w, frame_h, crop_w, crop_h);
    (ax - crop_w / 2.0, ay - crop_h / 2.0, crop_w, crop_h)
}

/// The thumbnail crop size and the downscale factor that must be applied to
/// the source frame so that `motion_box` fits inside `want_w x want_h`.
///
/// The returned crop size is always exactly `(want_w, want_h)`; `scale` is
/// `1.0` when the motion box already fits, otherwise the factor the caller
/// must shrink the source frame by before cropping.
pub fn resized_crop_size(motion_box: &BoundingBox, want_w: i32, want_h: i32) -> ((i32, i32), f64) {
    if motion_box.w <= want_w && motion_box.h <= want_h {
        ((want_w, want_h), 1.0)
    } else {
        let scale_w = motion_box.w as f64 / want_w as f64;
        let scale_h = motion_box.h as f64 / want_h as f64;
        ((want_w, want_h), scale_w.max(scale_h))
    }
}

/// Project an absolute-space box into crop-local coordinates, given the crop
/// size and the (already-aligned) crop center in the same space as the box.
pub fn relative_box(abs_box: &BoundingBox, crop_size: (i32, i32), aligned_center: (f32, f32)) -> BoundingBox {
    let (x, w) = relative_axis(abs_box.x, abs_box.w, crop_size.0, aligned_center.0);
    let (y, h) = relative_axis(abs_box.y, abs_box.h, crop_size.1, aligned_center.1);
    BoundingBox::new(x, y, w, h)
}

fn relative_axis(abs_pos: i32, abs_extent: i32, crop_extent: i32, aligned_center: f32) -> (i32, i32) {
    if abs_extent >= crop_extent {
        (0, crop_extent)
    } else {
        let x = crop_extent as f32 / 2.0 - (aligned_center - abs_pos as f32);
        (x.round() as i32, abs_extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_is_box_center() {
        let b = BoundingBox::new(10, 20, 40, 60);
        assert_eq!(centroid(&b), (30.0, 50.0));
    }

    #[test]
    fn align_centroid_keeps_crop_inside_frame_when_crop_fits() {
        // Many (center, frame, crop) combinations; crop always <= frame.
        let cases = [
            ((0.0, 0.0), (640.0, 480.0), (400.0, 300.0)),
            ((639.0, 479.0), (640.0, 480.0), (400.0, 300.0)),
            ((320.0, 240.0), (640.0, 480.0), (400.0, 300.0)),
            ((-50.0, -50.0), (640.0, 480.0), (400.0, 300.0)),
            ((1000.0, 1000.0), (640.0, 480.0), (400.0, 300.0)),
        ];
        for (c, frame, crop) in cases {
            let (x, y, w, h) = aligned_crop_rect(c, frame.0, frame.1, crop.0, crop.1);
            assert!(x >= -0.001, "x={x} out of bounds for case {c:?}");
            assert!(y >= -0.001, "y={y} out of bounds for case {c:?}");
            assert!(x + w <= frame.0 + 0.001, "x+w={} exceeds frame for case {c:?}", x + w);
            assert!(y + h <= frame.1 + 0.001, "y+h={} exceeds frame for case {c:?}", y + h);
        }
    }

    #[test]
    fn resized_crop_size_is_identity_when_motion_box_fits() {
        let b = BoundingBox::new(0, 0, 100, 80);
        let (size, scale) = resized_crop_size(&b, 400, 300);
        assert_eq!(size, (400, 300));
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn resized_crop_size_scales_by_the_larger_overhang() {
        // Motion box wider than target relative to its height.
        let b = BoundingBox::new(0, 0, 800, 300);
        let (size, scale) = resized_crop_size(&b, 400, 300);
        assert_eq!(size, (400, 300));
        assert_eq!(scale, 2.0); // 800/400 = 2.0 > 300/300 = 1.0
    }

    #[test]
    fn relative_box_of_a_box_that_fits_crop_is_within_bounds() {
        let crop = (400, 300);
        let center = (200.0, 150.0);
        let b = BoundingBox::new(150, 100, 100, 80);
        let r = relative_box(&b, crop, center);
        assert!(r.x >= 0 && r.x + r.w <= crop.0);
        assert!(r.y >= 0 && r.y + r.h <= crop.1);
    }

    #[test]
    fn relative_box_wider_than_crop_fills_the_crop_width() {
        let crop = (400, 300);
        let center = (200.0, 150.0);
        let b = BoundingBox::new(-50, 100, 900, 80);
        let r = relative_box(&b, crop, center);
        assert_eq!(r.x, 0);
        assert_eq!(r.w, crop.0);
    }
}
