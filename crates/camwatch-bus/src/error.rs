//! Error types for message-bus decode/encode and dispatch.

use thiserror::Error;

pub type BusResult<T> = Result<T, BusError>;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("malformed bus message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unrecognized topic: {0}")]
    UnknownTopic(String),

    #[error("numeric field could not be parsed: {0}")]
    BadNumber(String),

    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),
}
