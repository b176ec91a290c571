//! Process-wide application context.
//!
//! Everything with process lifetime is constructed here, once, at startup:
//! the embedding capability object, validated configuration, and the
//! directories the run needs. Components receive what they need
//! explicitly; there is no global service registry.

use std::path::PathBuf;
use std::sync::Arc;

use embed::{build_embedder, EmbedError, EmbeddingModel};
use pipeline::{
    DirAssetSink, ImageSequenceSource, IngestionPipeline, PipelineError,
};
use store::{StoreError, VectorStore};
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigLoadError, FramesiftConfig};

/// Errors raised while bringing the process context up. All fatal.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("embedding backend error: {0}")]
    Embed(#[from] EmbedError),

    #[error("could not create directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Explicit application context, built once and passed down by reference.
pub struct AppContext {
    pub config: FramesiftConfig,
    pub embedder: Arc<dyn EmbeddingModel>,
}

impl AppContext {
    /// Validate configuration, provision directories, and build the shared
    /// embedding capability.
    pub fn initialize(config: FramesiftConfig) -> Result<Self, ContextError> {
        config.validate()?;
        ensure_directories(&config)?;

        let embedder = build_embedder(&config.embedding)?;
        info!(
            mode = %config.embedding.mode,
            model = %config.embedding.model_name,
            dim = config.embedding.dim,
            "embedding backend ready"
        );

        Ok(Self { config, embedder })
    }

    /// Open the persisted vector store configured for this process.
    pub fn open_store(&self) -> Result<VectorStore, StoreError> {
        VectorStore::open(&self.config.index.dir, self.config.embedding.dim)
    }

    /// Assemble an ingestion pipeline over the configured store, frame
    /// source, and asset sink.
    pub fn build_pipeline(&self) -> Result<IngestionPipeline, PipelineError> {
        let store = self.open_store()?;
        IngestionPipeline::new(
            self.config.pipeline_config(),
            self.embedder.clone(),
            Box::new(ImageSequenceSource::new(self.config.ingest.sequence_fps)),
            Box::new(DirAssetSink::new()),
            store,
        )
    }
}

/// Create every directory the run needs; failure on any of them is fatal
/// at startup rather than a mid-run surprise.
fn ensure_directories(config: &FramesiftConfig) -> Result<(), ContextError> {
    let dirs = [
        &config.ingest.frames_dir,
        &config.ingest.video_dir,
        &config.index.dir,
    ];
    for dir in dirs {
        std::fs::create_dir_all(dir).map_err(|source| ContextError::Directory {
            path: dir.clone(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tempdir_config(root: &TempDir) -> FramesiftConfig {
        let mut config = FramesiftConfig::default();
        config.embedding.dim = 32;
        config.ingest.video_dir = root.path().join("videos");
        config.ingest.frames_dir = root.path().join("frames");
        config.index.dir = root.path().join("index");
        config
    }

    #[test]
    fn initialize_provisions_directories() {
        let root = TempDir::new().unwrap();
        let config = tempdir_config(&root);

        let ctx = AppContext::initialize(config).unwrap();
        assert!(ctx.config.ingest.video_dir.is_dir());
        assert!(ctx.config.ingest.frames_dir.is_dir());
        assert!(ctx.config.index.dir.is_dir());
        assert_eq!(ctx.embedder.dim(), 32);
    }

    #[test]
    fn initialize_rejects_invalid_config() {
        let root = TempDir::new().unwrap();
        let mut config = tempdir_config(&root);
        config.embedding.dim = 0;

        assert!(matches!(
            AppContext::initialize(config),
            Err(ContextError::Config(_))
        ));
    }

    #[test]
    fn pipeline_builds_against_fresh_store() {
        let root = TempDir::new().unwrap();
        let ctx = AppContext::initialize(tempdir_config(&root)).unwrap();
        let pipeline = ctx.build_pipeline().unwrap();
        assert!(pipeline.store().is_empty());
    }
}
