//! Transport
//!
//! Everything that leaves the process: the inference request, the blob
//! store the session export is written to, and the export encoding itself.

pub mod export;
pub mod inference;
pub mod retry;
pub mod storage;

pub use export::{SessionExport, SessionMetadata};
pub use inference::{HttpInferenceClient, InferenceClient, Prediction, PredictionSource, Scorer};
pub use retry::{send_with_retry, RetryPolicy};
pub use storage::{BlobStore, FsBlobStore};

/// Failure of the inference service or the blob store
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("service returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    MalformedBody(String),

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Storage(e.to_string())
    }
}
