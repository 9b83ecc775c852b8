//! The full per-tensor pipeline the classifier worker drives: decode, crop
//! and resize toward a detector's expected input, then quantize.

use camwatch_models::{BoundingBox, Nv12Frame, ScalingResult, TensorFormat};

use crate::error::VisionResult;
use crate::quantize::normalize_and_quantize;
use crate::resize::resize_frame;
use crate::yuv::yuv_to_rgb;

/// Decode `frame` to RGB, crop/resize it to `format`'s dimensions around
/// `union_box` (or plainly if `None`), and quantize the result to `format`'s
/// affine contract. Returns the quantized tensor and the scaling applied, so
/// callers can translate absolute-pixel boxes into thumbnail-relative ones
/// afterward.
pub fn convert_and_resize(
    frame: &Nv12Frame,
    format: &TensorFormat,
    union_box: Option<&BoundingBox>,
) -> VisionResult<(Vec<u8>, ScalingResult)> {
    let rgb = yuv_to_rgb(frame)?;
    let (resized, scaling) = resize_frame(
        &rgb,
        frame.w,
        frame.h,
        format.width as i32,
        format.height as i32,
        union_box,
    )?;
    let tensor = normalize_and_quantize(&resized, format);
    Ok((tensor, scaling))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_frame(w: u32, h: u32, y_val: u8, uv_val: u8) -> Nv12Frame {
        Nv12Frame::new(
            vec![y_val; (w * h) as usize],
            vec![uv_val; (w * h / 2) as usize],
            w,
            h,
            0,
        )
    }

    #[test]
    fn produces_a_tensor_sized_to_the_requested_format() {
        let frame = flat_frame(640, 480, 128, 128);
        let format = TensorFormat::symmetric_u8(300, 300);
        let (tensor, scaling) = convert_and_resize(&frame, &format, None).unwrap();
        assert_eq!(tensor.len(), 300 * 300 * 3);
        assert_eq!(scaling.scale_factor, 1.0);
    }

    #[test]
    fn honors_a_union_box_crop() {
        let frame = flat_frame(640, 480, 128, 128);
        let format = TensorFormat::symmetric_u8(300, 300);
        let b = BoundingBox::new(50, 50, 100, 100);
        let (tensor, scaling) = convert_and_resize(&frame, &format, Some(&b)).unwrap();
        assert_eq!(tensor.len(), 300 * 300 * 3);
        assert_eq!(scaling.scale_factor, 1.0);
    }
}
