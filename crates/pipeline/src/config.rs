//! Ingestion pipeline configuration.

use std::path::PathBuf;

use dedup::DedupConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating pipeline configuration. Fatal at
/// startup, never mid-run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid pipeline config: {0}")]
    Invalid(String),
}

/// Configuration for one ingestion pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory frame assets are written into; frame records store paths
    /// relative to it.
    #[serde(default = "default_frames_dir")]
    pub frames_dir: PathBuf,

    /// Accepted frames are committed to the store in batches of this size.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Target sampling rate handed to the frame source.
    #[serde(default = "default_extraction_fps")]
    pub extraction_fps: f64,

    /// File suffixes (with leading dot, lowercase) that identify video
    /// sources when scanning a directory.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Duplicate detector settings; `dedup.dim` must match the embedding
    /// model and the store.
    #[serde(default)]
    pub dedup: DedupConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be >= 1".into()));
        }
        if self.extraction_fps <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "extraction_fps must be positive, got {}",
                self.extraction_fps
            )));
        }
        if self.allowed_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "allowed_extensions must not be empty".into(),
            ));
        }
        self.dedup
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frames_dir: default_frames_dir(),
            batch_size: default_batch_size(),
            extraction_fps: default_extraction_fps(),
            allowed_extensions: default_allowed_extensions(),
            dedup: DedupConfig::default(),
        }
    }
}

fn default_frames_dir() -> PathBuf {
    PathBuf::from("static/frames")
}
fn default_batch_size() -> usize {
    32
}
fn default_extraction_fps() -> f64 {
    10.0
}
fn default_allowed_extensions() -> Vec<String> {
    vec![".mp4".to_string(), ".avi".to_string(), ".mov".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = PipelineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.batch_size, 32);
        assert!((cfg.extraction_fps - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_batch_size_rejected() {
        let cfg = PipelineConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn non_positive_fps_rejected() {
        let cfg = PipelineConfig {
            extraction_fps: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn invalid_dedup_section_rejected() {
        let cfg = PipelineConfig {
            dedup: DedupConfig {
                window_size: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
