//! YAML Configuration File Support for Framesift
//!
//! This module provides support for loading the whole-process Framesift
//! configuration from a YAML file: the embedding backend, duplicate
//! detection thresholds, ingestion settings, and the index location in a
//! single document loaded at startup.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # Framesift configuration
//! version: "1.0"
//!
//! embedding:
//!   mode: "stub"
//!   model_name: "clip-vit-large-patch14"
//!   dim: 768
//!
//! dedup:
//!   hash_threshold: 5
//!   similarity_threshold: 0.95
//!   window_size: 10
//!
//! ingest:
//!   video_dir: "data/videos"
//!   frames_dir: "static/frames"
//!   batch_size: 32
//!   extraction_fps: 10.0
//!   sequence_fps: 30.0
//!   allowed_extensions: [".mp4", ".avi", ".mov", ".frames"]
//!
//! index:
//!   dir: "data/index"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use dedup::DedupConfig;
use embed::EmbedConfig;
use pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the Framesift process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramesiftConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Embedding backend configuration
    #[serde(default)]
    pub embedding: EmbedConfig,

    /// Duplicate detection thresholds. The detector's dimension is taken
    /// from the embedding section; any `dim` set here is overridden.
    #[serde(default)]
    pub dedup: DedupConfig,

    /// Ingestion settings
    #[serde(default)]
    pub ingest: IngestSection,

    /// Index location
    #[serde(default)]
    pub index: IndexSection,
}

impl FramesiftConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: FramesiftConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }

        self.embedding
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.effective_dedup()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.ingest.validate()?;
        Ok(())
    }

    /// Duplicate-detector settings with the dimension pinned to the
    /// embedding section's value.
    pub fn effective_dedup(&self) -> DedupConfig {
        DedupConfig {
            dim: self.embedding.dim,
            ..self.dedup.clone()
        }
    }

    /// Assemble the pipeline configuration from the relevant sections.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            frames_dir: self.ingest.frames_dir.clone(),
            batch_size: self.ingest.batch_size,
            extraction_fps: self.ingest.extraction_fps,
            allowed_extensions: self.ingest.allowed_extensions.clone(),
            dedup: self.effective_dedup(),
        }
    }
}

impl Default for FramesiftConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            embedding: EmbedConfig::default(),
            dedup: DedupConfig::default(),
            ingest: IngestSection::default(),
            index: IndexSection::default(),
        }
    }
}

/// Ingestion section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSection {
    /// Directory scanned for video sources
    #[serde(default = "default_video_dir")]
    pub video_dir: PathBuf,

    /// Directory frame assets are written into
    #[serde(default = "default_frames_dir")]
    pub frames_dir: PathBuf,

    /// Store commit batch size
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Target frame sampling rate
    #[serde(default = "default_extraction_fps")]
    pub extraction_fps: f64,

    /// Native rate assumed for image-sequence clips
    #[serde(default = "default_sequence_fps")]
    pub sequence_fps: f64,

    /// Source name suffixes recognized when scanning the video directory
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl IngestSection {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.batch_size == 0 {
            return Err(ConfigLoadError::Validation(
                "ingest.batch_size must be >= 1".to_string(),
            ));
        }
        if self.extraction_fps <= 0.0 {
            return Err(ConfigLoadError::Validation(
                "ingest.extraction_fps must be positive".to_string(),
            ));
        }
        if self.sequence_fps <= 0.0 {
            return Err(ConfigLoadError::Validation(
                "ingest.sequence_fps must be positive".to_string(),
            ));
        }
        if self.allowed_extensions.is_empty() {
            return Err(ConfigLoadError::Validation(
                "ingest.allowed_extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            video_dir: default_video_dir(),
            frames_dir: default_frames_dir(),
            batch_size: default_batch_size(),
            extraction_fps: default_extraction_fps(),
            sequence_fps: default_sequence_fps(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

/// Index section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSection {
    /// Directory holding the persisted vector index artifacts
    #[serde(default = "default_index_dir")]
    pub dir: PathBuf,
}

impl Default for IndexSection {
    fn default() -> Self {
        Self {
            dir: default_index_dir(),
        }
    }
}

// Helper functions for serde defaults
fn default_version() -> String {
    "1.0".to_string()
}
fn default_video_dir() -> PathBuf {
    PathBuf::from("data/videos")
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
fn default_sequence_fps() -> f64 {
    30.0
}
fn default_allowed_extensions() -> Vec<String> {
    vec![
        ".mp4".to_string(),
        ".avi".to_string(),
        ".mov".to_string(),
        ".frames".to_string(),
    ]
}
fn default_index_dir() -> PathBuf {
    PathBuf::from("data/index")
}
