//! Model runner interface, ONNX Runtime backend, prediction filter, and the
//! top-K score buffer used by the classifier worker.

pub mod error;
pub mod filter;
pub mod runner;
pub mod topk;

#[cfg(feature = "onnx")]
pub mod ort_backend;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use error::{ModelError, ModelResult};
pub use filter::{inside_box, inside_normalized_box, inside_roi, process, process_normalized};
pub use runner::ModelRunner;
pub use topk::TopKBuffer;

#[cfg(feature = "onnx")]
pub use ort_backend::OrtModelRunner;

#[cfg(any(test, feature = "test-util"))]
pub use mock::MockModelRunner;
