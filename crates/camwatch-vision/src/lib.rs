//! The image transform kernel: YUV decode, crop/resize, normalize, quantize,
//! and JPEG encode. Every function is pure except [`jpeg::write_jpeg`].

pub mod error;
pub mod jpeg;
pub mod pipeline;
pub mod quantize;
pub mod resize;
pub mod yuv;

pub use error::{VisionError, VisionResult};
pub use jpeg::write_jpeg;
pub use pipeline::convert_and_resize;
pub use quantize::{normalize, normalize_and_quantize, quantize};
pub use resize::resize_frame;
pub use yuv::yuv_to_rgb;
