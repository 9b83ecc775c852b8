//! A scripted [`ModelRunner`] for deterministic tests of C4/C5/C7 without a
//! real `.onnx` file on disk.

use camwatch_models::{BoxPrediction, TensorFormat};

use crate::error::ModelResult;
use crate::runner::ModelRunner;

/// Replays a fixed, score-descending `Vec<BoxPrediction>` for every call to
/// [`ModelRunner::run`], ignoring the input tensor entirely.
pub struct MockModelRunner {
    format: TensorFormat,
    scripted: Vec<BoxPrediction>,
}

impl MockModelRunner {
    pub fn new(scripted: Vec<BoxPrediction>) -> Self {
        Self {
            format: TensorFormat::symmetric_u8(300, 300),
            scripted,
        }
    }

    pub fn with_tensor_format(mut self, format: TensorFormat) -> Self {
        self.format = format;
        self
    }
}

impl ModelRunner for MockModelRunner {
    fn init(&mut self) -> ModelResult<()> {
        Ok(())
    }

    fn tensor_format(&self) -> TensorFormat {
        self.format
    }

    fn run(&self, _tensor: &[u8]) -> ModelResult<Vec<BoxPrediction>> {
        Ok(self.scripted.clone())
    }
}
