//! # Framesift Embedding Capability
//!
//! Visual-semantic embeddings are produced by an external CLIP-style model;
//! this crate is the narrow interface the rest of Framesift consumes. The
//! model is built **once** at process start as an explicit capability object
//! ([`EmbeddingModel`] behind an `Arc`) and passed by reference to every
//! component that needs embeddings. There is no implicit global model
//! lookup.
//!
//! ## Contract
//!
//! - Images and text embed into the **same** vector space with one shared
//!   dimension, available via [`EmbeddingModel::dim`].
//! - Every produced vector is L2-normalized, so the inner product of two
//!   embeddings equals their cosine similarity.
//! - Embedding is synchronous and blocking; callers own any scheduling.
//!
//! ## Backends
//!
//! - [`StubEmbedder`]: deterministic, offline, model-free. Hashes the input
//!   and expands the seed into a reproducible unit vector. Used by tests and
//!   by deployments without a model service.
//! - [`ApiEmbedder`]: blocking HTTP client for a CLIP inference service
//!   (`{"text": ...}` / `{"image": <base64 jpeg>}` in, `{"embedding": [...]}`
//!   out).
//! - [`CachingEmbedder`]: LRU text-query cache wrapped around either, for
//!   the read path where the same free-text queries repeat.
//!
//! [`build_embedder`] assembles the configured backend (plus cache) from an
//! [`EmbedConfig`].

mod api;
mod cache;
mod config;
mod error;
mod normalize;
mod stub;

use std::sync::Arc;

use image::RgbImage;

pub use crate::api::ApiEmbedder;
pub use crate::cache::CachingEmbedder;
pub use crate::config::EmbedConfig;
pub use crate::error::EmbedError;
pub use crate::normalize::l2_normalize_in_place;
pub use crate::stub::StubEmbedder;

/// A CLIP-style embedding model: images and text into one shared,
/// L2-normalized vector space of fixed dimension.
pub trait EmbeddingModel: Send + Sync {
    /// The shared embedding dimension for both modalities.
    fn dim(&self) -> usize;

    /// Embed a single RGB frame into a unit vector of [`dim`](Self::dim)
    /// components.
    fn embed_image(&self, frame: &RgbImage) -> Result<Vec<f32>, EmbedError>;

    /// Embed free text into a unit vector of [`dim`](Self::dim) components.
    fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Build the configured embedding backend.
///
/// Validates the configuration, constructs the backend selected by
/// `cfg.mode` ("stub" or "api"), and wraps it in a text-query LRU cache
/// when `cfg.query_cache_size > 0`.
pub fn build_embedder(cfg: &EmbedConfig) -> Result<Arc<dyn EmbeddingModel>, EmbedError> {
    cfg.validate()?;

    let backend: Arc<dyn EmbeddingModel> = match cfg.mode.as_str() {
        "stub" => Arc::new(StubEmbedder::new(cfg)),
        "api" => Arc::new(ApiEmbedder::new(cfg)?),
        other => {
            return Err(EmbedError::InvalidConfig(format!(
                "unknown embedding mode `{other}`"
            )))
        }
    };

    if cfg.query_cache_size > 0 {
        Ok(Arc::new(CachingEmbedder::new(backend, cfg.query_cache_size)))
    } else {
        Ok(backend)
    }
}
