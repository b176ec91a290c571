//! Embedding backend configuration.

use serde::{Deserialize, Serialize};

use crate::EmbedError;

/// Configuration for the embedding capability.
///
/// One instance is loaded at process start and used to build the single
/// [`EmbeddingModel`](crate::EmbeddingModel) the process shares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Backend selection: `"stub"` (deterministic, offline) or `"api"`
    /// (remote CLIP inference service).
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Model identifier forwarded to the inference service.
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Shared embedding dimension for images and text.
    #[serde(default = "default_dim")]
    pub dim: usize,

    /// Inference service endpoint; required in `"api"` mode.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Value for the `Authorization` header, if the service needs one.
    #[serde(default)]
    pub api_auth_header: Option<String>,

    /// Per-request timeout for the API backend.
    #[serde(default = "default_timeout")]
    pub api_timeout_secs: Option<u64>,

    /// L2-normalize produced vectors. The rest of the system assumes
    /// unit-norm embeddings; disable only for diagnostics.
    #[serde(default = "default_true")]
    pub normalize: bool,

    /// Capacity of the text-query LRU cache; `0` disables caching.
    #[serde(default = "default_query_cache_size")]
    pub query_cache_size: usize,
}

impl EmbedConfig {
    /// Validate the configuration; called by
    /// [`build_embedder`](crate::build_embedder).
    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.dim == 0 {
            return Err(EmbedError::InvalidConfig(
                "embedding dim must be >= 1".into(),
            ));
        }
        match self.mode.as_str() {
            "stub" => Ok(()),
            "api" => {
                if self.api_url.is_none() {
                    return Err(EmbedError::InvalidConfig(
                        "api_url is required for api mode".into(),
                    ));
                }
                Ok(())
            }
            other => Err(EmbedError::InvalidConfig(format!(
                "mode must be `stub` or `api`, got `{other}`"
            ))),
        }
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            model_name: default_model_name(),
            dim: default_dim(),
            api_url: None,
            api_auth_header: None,
            api_timeout_secs: default_timeout(),
            normalize: true,
            query_cache_size: default_query_cache_size(),
        }
    }
}

fn default_mode() -> String {
    "stub".to_string()
}
fn default_model_name() -> String {
    "clip-vit-large-patch14".to_string()
}
fn default_dim() -> usize {
    768
}
fn default_timeout() -> Option<u64> {
    Some(30)
}
fn default_true() -> bool {
    true
}
fn default_query_cache_size() -> usize {
    256
}
