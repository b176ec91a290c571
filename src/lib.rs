//! Umbrella crate for Framesift.
//!
//! Framesift indexes video frames by visual-semantic embedding and serves
//! free-text similarity search over them. The work is split across
//! focused crates; this crate stitches them together so callers get a
//! single entry point:
//!
//! - [`phash`] - perceptual image hashing, the cheap first dedup filter
//! - [`dedup`] - the per-video multi-stage duplicate detector
//! - [`store`] - the append-only persistent vector store
//! - [`embed`] - the CLIP-style embedding capability
//! - [`pipeline`] - the batch ingestion pipeline over all of the above
//!
//! Process wiring lives here: [`FramesiftConfig`] loads the YAML
//! configuration, [`AppContext`] builds the shared embedding capability
//! and provisions directories once at startup, and the `framesift` binary
//! drives an ingestion run. Serving is a separate process (the
//! `framesift-server` crate) that reads the index this side produces.
//!
//! ## Ingestion in five lines
//!
//! ```no_run
//! let config = framesift::FramesiftConfig::default();
//! let ctx = framesift::AppContext::initialize(config)?;
//! let mut pipeline = ctx.build_pipeline()?;
//! pipeline.ingest_all(
//!     &ctx.config.ingest.video_dir.clone(),
//!     &ctx.config.ingest.allowed_extensions.clone(),
//! )?;
//! pipeline.finalize()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod context;

pub use crate::config::{ConfigLoadError, FramesiftConfig, IndexSection, IngestSection};
pub use crate::context::{AppContext, ContextError};

pub use dedup::{DedupConfig, DedupError, DuplicateDetector, Verdict};
pub use embed::{build_embedder, EmbedConfig, EmbedError, EmbeddingModel, StubEmbedder};
pub use phash::PerceptualHash;
pub use pipeline::{
    AssetSink, DirAssetSink, FrameSource, ImageSequenceSource, IngestionPipeline, PipelineConfig,
    PipelineError, RunStats, VideoStats,
};
pub use store::{FrameRecord, StoreError, VectorStore};
