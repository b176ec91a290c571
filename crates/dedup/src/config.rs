//! Duplicate detector configuration and error surface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the per-video duplicate detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Embedding dimension every evaluated vector must have.
    #[serde(default = "default_dim")]
    pub dim: usize,

    /// Maximum perceptual-hash distance at which two frames are considered
    /// visually identical. The hash stage fires on `distance < threshold`.
    #[serde(default = "default_hash_threshold")]
    pub hash_threshold: u32,

    /// Rescaled cosine similarity above which two embeddings are
    /// considered duplicates. Rescaling maps `[-1, 1]` onto `[0, 1]` via
    /// `(dot + 1) / 2`.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Number of most recent accepted embeddings checked exactly before
    /// falling back to the approximate lookback stage.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

impl DedupConfig {
    pub fn validate(&self) -> Result<(), DedupError> {
        if self.dim == 0 {
            return Err(DedupError::InvalidConfig("dim must be >= 1".into()));
        }
        if self.window_size == 0 {
            return Err(DedupError::InvalidConfig(
                "window_size must be >= 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(DedupError::InvalidConfig(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            dim: default_dim(),
            hash_threshold: default_hash_threshold(),
            similarity_threshold: default_similarity_threshold(),
            window_size: default_window_size(),
        }
    }
}

fn default_dim() -> usize {
    768
}
fn default_hash_threshold() -> u32 {
    5
}
fn default_similarity_threshold() -> f32 {
    0.95
}
fn default_window_size() -> usize {
    10
}

/// Errors produced by the duplicate detector.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DedupError {
    /// The detector was built with an unusable configuration.
    #[error("invalid dedup config: {0}")]
    InvalidConfig(String),

    /// An evaluated embedding's length disagrees with the configured
    /// dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}
