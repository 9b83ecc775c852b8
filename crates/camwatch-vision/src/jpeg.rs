//! JPEG encoding for the finished thumbnail and optional debug dumps.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageEncoder};

use crate::error::VisionResult;

/// Encode a packed RGB8 buffer as a JPEG file at `quality` (0-100).
pub fn write_jpeg(path: impl AsRef<Path>, rgb: &[u8], w: u32, h: u32, quality: u8) -> VisionResult<()> {
    let file = std::fs::File::create(path)?;
    let mut encoder = JpegEncoder::new_with_quality(file, quality);
    encoder.write_image(rgb, w, h, ColorType::Rgb8)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_a_readable_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpeg");
        let rgb = vec![128u8; 4 * 4 * 3];
        write_jpeg(&path, &rgb, 4, 4, 95).unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 4);
    }
}
