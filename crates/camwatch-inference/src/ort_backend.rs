//! ONNX Runtime backed [`ModelRunner`], wired for the cascaded SSD-style
//! person/delivery detectors: four named outputs (`detection_boxes`,
//! `detection_classes`, `detection_scores`, `num_detections`), already
//! NMS'd and score-sorted by the model's own post-processing op.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use camwatch_models::{BoxPrediction, DetectionClass, TensorFormat};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ModelError, ModelResult};
use crate::runner::ModelRunner;

/// `{scale, zero_point, l_bound, u_bound}` sidecar read alongside the `.onnx`
/// file when the session's own input metadata doesn't carry quantization
/// parameters.
#[derive(Debug, Deserialize)]
struct TensorFormatSidecar {
    width: u32,
    height: u32,
    scale: f32,
    zero_point: i32,
    l_bound: u8,
    u_bound: u8,
}

pub struct OrtModelRunner {
    model_path: PathBuf,
    sidecar_path: PathBuf,
    session: Option<Mutex<Session>>,
    tensor_format: Option<TensorFormat>,
}

impl OrtModelRunner {
    /// `model_path` names the `.onnx` file; the sidecar is the same path
    /// with its extension swapped to `.json`.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        let model_path = model_path.into();
        let sidecar_path = model_path.with_extension("json");
        Self {
            model_path,
            sidecar_path,
            session: None,
            tensor_format: None,
        }
    }

    fn load_tensor_format(&self) -> ModelResult<TensorFormat> {
        let bytes = std::fs::read(&self.sidecar_path).map_err(|e| {
            ModelError::TensorFormatUnavailable(format!(
                "{}: {e}",
                self.sidecar_path.display()
            ))
        })?;
        let sidecar: TensorFormatSidecar = serde_json::from_slice(&bytes).map_err(|e| {
            ModelError::TensorFormatUnavailable(format!(
                "{}: {e}",
                self.sidecar_path.display()
            ))
        })?;
        Ok(TensorFormat {
            width: sidecar.width,
            height: sidecar.height,
            channels: 3,
            scale: sidecar.scale,
            zero_point: sidecar.zero_point,
            l_bound: sidecar.l_bound,
            u_bound: sidecar.u_bound,
        })
    }
}

impl ModelRunner for OrtModelRunner {
    fn init(&mut self) -> ModelResult<()> {
        if !Path::new(&self.model_path).exists() {
            return Err(ModelError::ModelNotFound(self.model_path.display().to_string()));
        }

        let session = Session::builder()
            .map_err(|e| ModelError::load_failed(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::load_failed(e.to_string()))?
            .commit_from_file(&self.model_path)
            .map_err(|e| ModelError::load_failed(e.to_string()))?;

        let tensor_format = match self.load_tensor_format() {
            Ok(fmt) => fmt,
            Err(e) => {
                warn!(error = %e, "tensor format sidecar unavailable, using symmetric u8 default");
                TensorFormat::symmetric_u8(300, 300)
            }
        };

        info!(
            model_path = %self.model_path.display(),
            width = tensor_format.width,
            height = tensor_format.height,
            "model runner initialized"
        );

        self.session = Some(Mutex::new(session));
        self.tensor_format = Some(tensor_format);
        Ok(())
    }

    fn tensor_format(&self) -> TensorFormat {
        self.tensor_format
            .clone()
            .unwrap_or_else(|| TensorFormat::symmetric_u8(300, 300))
    }

    fn run(&self, tensor: &[u8]) -> ModelResult<Vec<BoxPrediction>> {
        let session_lock = self
            .session
            .as_ref()
            .ok_or_else(|| ModelError::inference_failed("model not initialized"))?;
        let mut session = session_lock
            .lock()
            .map_err(|_| ModelError::inference_failed("session lock poisoned"))?;

        let fmt = self.tensor_format();
        let shape = vec![1usize, fmt.height as usize, fmt.width as usize, 3];
        let input = Tensor::from_array((shape, tensor.to_vec().into_boxed_slice()))
            .map_err(|e| ModelError::inference_failed(format!("tensor build failed: {e}")))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| ModelError::inference_failed(format!("session run failed: {e}")))?;

        let boxes = outputs
            .get("detection_boxes")
            .ok_or_else(|| ModelError::inference_failed("missing detection_boxes output"))?
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::inference_failed(e.to_string()))?
            .1
            .to_vec();
        let classes = outputs
            .get("detection_classes")
            .ok_or_else(|| ModelError::inference_failed("missing detection_classes output"))?
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::inference_failed(e.to_string()))?
            .1
            .to_vec();
        let scores = outputs
            .get("detection_scores")
            .ok_or_else(|| ModelError::inference_failed("missing detection_scores output"))?
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::inference_failed(e.to_string()))?
            .1
            .to_vec();

        let n = scores.len();
        let mut predictions = Vec::with_capacity(n);
        for i in 0..n {
            let base = i * 4;
            if base + 4 > boxes.len() {
                break;
            }
            let class = match classes.get(i).copied().unwrap_or(0.0) as i32 {
                1 => DetectionClass::Person,
                2 => DetectionClass::Delivery,
                _ => DetectionClass::Unknown,
            };
            predictions.push(BoxPrediction {
                y_min: boxes[base],
                x_min: boxes[base + 1],
                y_max: boxes[base + 2],
                x_max: boxes[base + 3],
                confidence: scores[i],
                class,
            });
        }

        debug!(count = predictions.len(), "model run complete");
        Ok(predictions)
    }
}
