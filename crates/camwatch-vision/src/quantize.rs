//! Float normalization and affine quantization to the detector's u8 tensor.

use camwatch_models::TensorFormat;

/// `out = in / 255.0`, per channel. `rgb_u8` is a packed RGB8 buffer.
pub fn normalize(rgb_u8: &[u8]) -> Vec<f32> {
    rgb_u8.iter().map(|&p| p as f32 / 255.0).collect()
}

/// The exact affine-quantization formula the cascaded TFLite-style models
/// expect: map `[0, 1]` to `[-1, 0.9921875]` and quantize symmetric around
/// zero. Tested bit-for-bit at the anchor points in the module tests below.
///
/// `_params` is accepted (rather than the two hardcoded constants below) so
/// a future model with a different affine contract can plug in without
/// changing this function's signature; today every cascaded model shares
/// the same contract.
pub fn quantize(rgb_f32: &[f32], _params: &TensorFormat) -> Vec<u8> {
    rgb_f32.iter().map(|&p| quantize_one(p)).collect()
}

fn quantize_one(pixel: f32) -> u8 {
    let transformed = pixel * 1.9921875 - 1.0;
    let out = 128.0 + transformed / 0.0078125;
    out.round().clamp(0.0, 255.0) as u8
}

/// Normalize then quantize in one pass, avoiding the intermediate `Vec<f32>`.
pub fn normalize_and_quantize(rgb_u8: &[u8], _params: &TensorFormat) -> Vec<u8> {
    rgb_u8.iter().map(|&p| quantize_one(p as f32 / 255.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt() -> TensorFormat {
        TensorFormat::symmetric_u8(1, 1)
    }

    #[test]
    fn quantize_round_trips_at_anchor_points() {
        for &p in &[0u8, 64, 128, 192, 255] {
            let n = normalize(&[p]);
            let q = quantize(&n, &fmt());
            assert_eq!(q[0], p, "anchor {p} did not round-trip");
        }
    }

    #[test]
    fn quantize_zero_maps_to_zero() {
        assert_eq!(quantize_one(0.0), 0);
    }

    #[test]
    fn quantize_full_scale_maps_to_255() {
        assert_eq!(quantize_one(1.0), 255);
    }

    #[test]
    fn normalize_divides_by_255() {
        let n = normalize(&[0, 255, 128]);
        assert_eq!(n[0], 0.0);
        assert_eq!(n[1], 1.0);
        assert!((n[2] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_and_quantize_matches_the_two_step_path() {
        let data = [0u8, 64, 128, 192, 255];
        let two_step = quantize(&normalize(&data), &fmt());
        let fused = normalize_and_quantize(&data, &fmt());
        assert_eq!(two_step, fused);
    }
}
