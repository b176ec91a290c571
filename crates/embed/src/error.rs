//! Error surface for the embedding capability.

use thiserror::Error;

/// Errors produced while building or invoking an embedding backend.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EmbedError {
    /// The embedding configuration is unusable (bad mode, missing URL,
    /// zero dimension). Fatal at startup.
    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),

    /// The backend could not reach the inference service.
    #[error("embedding transport failure: {0}")]
    Transport(String),

    /// The backend reached the service but could not produce a usable
    /// vector (encode failure, malformed response).
    #[error("embedding inference failure: {0}")]
    Inference(String),

    /// The backend returned a vector of the wrong dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}
