//! Blocking HTTP client for a remote CLIP inference service.

use std::io::Cursor;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::RgbImage;
use serde_json::{json, Value};
use ureq::AgentBuilder;

use crate::normalize::l2_normalize_in_place;
use crate::{EmbedConfig, EmbedError, EmbeddingModel};

/// Embedding backend that posts inputs to a CLIP inference service.
///
/// Requests are synchronous with a configured timeout. Text is sent as
/// `{"text": ..., "model": ...}`, images as a base64 JPEG under
/// `{"image": ..., "model": ...}`; the service answers
/// `{"embedding": [...]}` (a bare array is also accepted). The returned
/// dimension is validated against the configured one.
pub struct ApiEmbedder {
    agent: ureq::Agent,
    url: String,
    auth_header: Option<String>,
    model_name: String,
    dim: usize,
    normalize: bool,
}

impl ApiEmbedder {
    pub fn new(cfg: &EmbedConfig) -> Result<Self, EmbedError> {
        let url = cfg
            .api_url
            .clone()
            .ok_or_else(|| EmbedError::InvalidConfig("api_url is required for api mode".into()))?;
        let timeout = Duration::from_secs(cfg.api_timeout_secs.unwrap_or(30));
        Ok(Self {
            agent: AgentBuilder::new().timeout(timeout).build(),
            url,
            auth_header: cfg.api_auth_header.clone(),
            model_name: cfg.model_name.clone(),
            dim: cfg.dim,
            normalize: cfg.normalize,
        })
    }

    fn request_embedding(&self, payload: Value) -> Result<Vec<f32>, EmbedError> {
        let mut request = self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json");
        if let Some(header) = self.auth_header.as_deref() {
            request = request.set("Authorization", header);
        }

        let response = request
            .send_string(&payload.to_string())
            .map_err(|e| EmbedError::Transport(e.to_string()))?;
        let body = response
            .into_string()
            .map_err(|e| EmbedError::Transport(e.to_string()))?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| EmbedError::Inference(e.to_string()))?;

        let mut vector = parse_embedding_response(value)?;
        if vector.len() != self.dim {
            return Err(EmbedError::DimensionMismatch {
                expected: self.dim,
                got: vector.len(),
            });
        }
        if self.normalize {
            l2_normalize_in_place(&mut vector);
        }
        Ok(vector)
    }
}

impl EmbeddingModel for ApiEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_image(&self, frame: &RgbImage) -> Result<Vec<f32>, EmbedError> {
        let mut encoded = Cursor::new(Vec::new());
        frame
            .write_to(&mut encoded, image::ImageFormat::Jpeg)
            .map_err(|e| EmbedError::Inference(format!("jpeg encode failed: {e}")))?;
        let payload = json!({
            "image": BASE64.encode(encoded.into_inner()),
            "model": self.model_name,
        });
        self.request_embedding(payload)
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let payload = json!({
            "text": text,
            "model": self.model_name,
        });
        self.request_embedding(payload)
    }
}

/// Extract the embedding vector from a service response.
///
/// Accepts `{"embedding": [...]}` or a bare `[...]`.
fn parse_embedding_response(value: Value) -> Result<Vec<f32>, EmbedError> {
    let array = match value {
        Value::Object(mut map) => match map.remove("embedding") {
            Some(embedding) => embedding,
            None => {
                return Err(EmbedError::Inference(
                    "response object is missing `embedding`".into(),
                ))
            }
        },
        other => other,
    };

    match array {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| EmbedError::Inference("non-finite embedding value".into())),
                other => Err(EmbedError::Inference(format!(
                    "embedding entries must be numbers, got {other:?}"
                ))),
            })
            .collect(),
        other => Err(EmbedError::Inference(format!(
            "embedding must be an array, got {other:?}"
        ))),
    }
}
