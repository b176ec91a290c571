//! Error taxonomy for the ingestion pipeline.
//!
//! Propagation rules: frame-level failures (embedding, asset sink) never
//! escalate past the frame; video-level failures (source open/decode,
//! store commit) never escalate past the video when driven through
//! [`ingest_all`](crate::IngestionPipeline::ingest_all); a failed persist
//! escalates to the caller of
//! [`finalize`](crate::IngestionPipeline::finalize).

use thiserror::Error;

use crate::config::ConfigError;
use crate::sink::SinkError;
use crate::source::SourceError;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("embedding error: {0}")]
    Embed(#[from] embed::EmbedError),

    #[error("dedup error: {0}")]
    Dedup(#[from] dedup::DedupError),

    #[error("store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("asset sink error: {0}")]
    Sink(#[from] SinkError),
}
