//! Crop-and-resize: the core of smart-thumbnail generation.

use camwatch_geom::{align_centroid, centroid, resized_crop_size};
use camwatch_models::{BoundingBox, ScalingResult};
use image::{imageops, ImageBuffer, Rgb};

use crate::error::{VisionError, VisionResult};

/// Resize `rgb` (`src_w x src_h`, packed RGB8) to `want_w x want_h`.
///
/// When `union_box` is `None` (or empty), this is a plain bilinear resize
/// and the returned [`ScalingResult`] is the identity. Otherwise the source
/// is downscaled (if needed) so the motion blob fits the target dimensions,
/// then a `want_w x want_h` window centered on the blob is extracted with
/// sub-pixel bilinear sampling.
pub fn resize_frame(
    rgb: &[u8],
    src_w: u32,
    src_h: u32,
    want_w: i32,
    want_h: i32,
    union_box: Option<&BoundingBox>,
) -> VisionResult<(Vec<u8>, ScalingResult)> {
    match union_box {
        None => plain_resize(rgb, src_w, src_h, want_w, want_h),
        Some(b) if b.is_empty() => plain_resize(rgb, src_w, src_h, want_w, want_h),
        Some(b) => cropped_resize(rgb, src_w, src_h, want_w, want_h, b),
    }
}

fn plain_resize(rgb: &[u8], src_w: u32, src_h: u32, want_w: i32, want_h: i32) -> VisionResult<(Vec<u8>, ScalingResult)> {
    let out = bilinear_resize(rgb, src_w, src_h, want_w as u32, want_h as u32)?;
    Ok((out, ScalingResult::identity(want_w, want_h)))
}

fn cropped_resize(
    rgb: &[u8],
    src_w: u32,
    src_h: u32,
    want_w: i32,
    want_h: i32,
    union_box: &BoundingBox,
) -> VisionResult<(Vec<u8>, ScalingResult)> {
    let (crop_size, scale) = resized_crop_size(union_box, want_w, want_h);

    let (working_rgb, working_w, working_h, scaled_box);
    if scale != 1.0 {
        let rescaled_w = ((src_w as f64) / scale).round().max(1.0) as u32;
        let rescaled_h = ((src_h as f64) / scale).round().max(1.0) as u32;
        working_rgb = bilinear_resize(rgb, src_w, src_h, rescaled_w, rescaled_h)?;
        working_w = rescaled_w;
        working_h = rescaled_h;
        scaled_box = union_box.scale_down(scale);
    } else {
        working_rgb = rgb.to_vec();
        working_w = src_w;
        working_h = src_h;
        scaled_box = *union_box;
    }

    let c = centroid(&scaled_box);
    let aligned_center = align_centroid(c, working_w as f32, working_h as f32, crop_size.0 as f32, crop_size.1 as f32);

    let out = extract_subpixel_rect(&working_rgb, working_w, working_h, aligned_center, crop_size)?;

    Ok((
        out,
        ScalingResult {
            scale_factor: scale,
            crop_center: aligned_center,
            crop_size,
        },
    ))
}

/// Bilinear (Triangle-filter) resize via the `image` crate.
fn bilinear_resize(rgb: &[u8], src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> VisionResult<Vec<u8>> {
    let buf: ImageBuffer<Rgb<u8>, _> = ImageBuffer::from_raw(src_w, src_h, rgb.to_vec())
        .ok_or(VisionError::BufferTooSmall { expected: (src_w * src_h * 3) as usize, got: rgb.len() })?;
    let resized = imageops::resize(&buf, dst_w, dst_h, imageops::FilterType::Triangle);
    Ok(resized.into_raw())
}

/// Extract a `crop_w x crop_h` sub-rectangle centered at `center`, with
/// bilinear sub-pixel sampling at each output pixel. This is the
/// `getRectSubPix`-equivalent the `image` crate has no direct analogue for.
fn extract_subpixel_rect(
    rgb: &[u8],
    src_w: u32,
    src_h: u32,
    center: (f32, f32),
    crop_size: (i32, i32),
) -> VisionResult<Vec<u8>> {
    let (crop_w, crop_h) = crop_size;
    if crop_w <= 0 || crop_h <= 0 {
        return Err(VisionError::SubPixelExtraction("non-positive crop size".to_string()));
    }
    let top_left_x = center.0 - crop_w as f32 / 2.0;
    let top_left_y = center.1 - crop_h as f32 / 2.0;

    let mut out = vec![0u8; (crop_w * crop_h * 3) as usize];
    for oy in 0..crop_h {
        let sy = top_left_y + oy as f32;
        for ox in 0..crop_w {
            let sx = top_left_x + ox as f32;
            let px = sample_bilinear(rgb, src_w, src_h, sx, sy);
            let out_idx = ((oy * crop_w + ox) * 3) as usize;
            out[out_idx] = px[0];
            out[out_idx + 1] = px[1];
            out[out_idx + 2] = px[2];
        }
    }
    Ok(out)
}

fn sample_bilinear(rgb: &[u8], w: u32, h: u32, x: f32, y: f32) -> [u8; 3] {
    let x = x.clamp(0.0, w as f32 - 1.0);
    let y = y.clamp(0.0, h as f32 - 1.0);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let mut out = [0.0f32; 3];
    for c in 0..3 {
        let p00 = rgb[((y0 * w + x0) * 3 + c) as usize] as f32;
        let p10 = rgb[((y0 * w + x1) * 3 + c) as usize] as f32;
        let p01 = rgb[((y1 * w + x0) * 3 + c) as usize] as f32;
        let p11 = rgb[((y1 * w + x1) * 3 + c) as usize] as f32;

        let top = p00 * (1.0 - fx) + p10 * fx;
        let bottom = p01 * (1.0 - fx) + p11 * fx;
        out[c as usize] = top * (1.0 - fy) + bottom * fy;
    }
    [out[0].round() as u8, out[1].round() as u8, out[2].round() as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_rgb(w: u32, h: u32, color: [u8; 3]) -> Vec<u8> {
        (0..(w * h)).flat_map(|_| color).collect()
    }

    #[test]
    fn plain_resize_without_union_box_yields_identity_scaling() {
        let rgb = solid_rgb(640, 480, [10, 20, 30]);
        let (out, scaling) = resize_frame(&rgb, 640, 480, 400, 300, None).unwrap();
        assert_eq!(out.len(), (400 * 300 * 3) as usize);
        assert_eq!(scaling.scale_factor, 1.0);
        assert_eq!(scaling.crop_size, (400, 300));
    }

    #[test]
    fn cropped_resize_with_tiny_union_box_does_not_rescale() {
        let rgb = solid_rgb(640, 480, [200, 100, 50]);
        let b = BoundingBox::new(100, 100, 50, 50);
        let (out, scaling) = resize_frame(&rgb, 640, 480, 400, 300, Some(&b)).unwrap();
        assert_eq!(out.len(), (400 * 300 * 3) as usize);
        assert_eq!(scaling.scale_factor, 1.0);
    }

    #[test]
    fn cropped_resize_with_oversized_union_box_downscales() {
        let rgb = solid_rgb(2000, 1500, [1, 2, 3]);
        let b = BoundingBox::new(0, 0, 1600, 300);
        let (_out, scaling) = resize_frame(&rgb, 2000, 1500, 400, 300, Some(&b)).unwrap();
        assert!(scaling.scale_factor > 1.0);
    }

    #[test]
    fn sampling_a_solid_color_frame_yields_that_color() {
        let rgb = solid_rgb(20, 20, [77, 88, 99]);
        let px = sample_bilinear(&rgb, 20, 20, 10.3, 5.7);
        assert_eq!(px, [77, 88, 99]);
    }
}
