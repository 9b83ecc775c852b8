//! Error types for model loading and inference.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),

    #[error("model failed to load: {0}")]
    LoadFailed(String),

    #[error("tensor format sidecar could not be read: {0}")]
    TensorFormatUnavailable(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),
}

impl ModelError {
    pub fn load_failed(msg: impl Into<String>) -> Self {
        Self::LoadFailed(msg.into())
    }

    pub fn inference_failed(msg: impl Into<String>) -> Self {
        Self::InferenceFailed(msg.into())
    }
}
