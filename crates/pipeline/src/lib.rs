//! # Framesift Ingestion Pipeline
//!
//! Orchestrates one batch ingestion run: pull sampled frames from a
//! [`FrameSource`], embed them through the shared [`EmbeddingModel`]
//! capability, judge each against the per-video [`DuplicateDetector`], and
//! commit accepted (embedding, record) pairs to the [`VectorStore`] in
//! batches.
//!
//! ## Guarantees
//!
//! - **Per-video isolation**: a failing video is logged and skipped;
//!   everything already committed to the store stays committed.
//! - **Frame-scoped recovery**: an embedding or asset-sink failure drops
//!   that frame only.
//! - **Within-run idempotency**: a video name seen earlier in the run is a
//!   no-op. Nothing about processed videos is persisted across runs.
//! - **Explicit persistence**: the pipeline never persists implicitly.
//!   Call [`IngestionPipeline::finalize`] when the run is done; it skips
//!   the disk write entirely when the run stored zero new frames.
//!
//! The pipeline is fully synchronous and single-threaded: extraction,
//! embedding, dedup and store mutation happen strictly in sequence. It
//! holds the only mutable handle to the store and detector for the
//! duration of the run.

mod config;
mod error;
mod sink;
mod source;
mod stats;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use dedup::{DuplicateDetector, Verdict};
use embed::EmbeddingModel;
use store::{FrameRecord, VectorStore};
use tracing::{error, info, warn, Level};

pub use crate::config::{ConfigError, PipelineConfig};
pub use crate::error::PipelineError;
pub use crate::sink::{AssetSink, DirAssetSink, SinkError};
pub use crate::source::{FrameSource, ImageSequenceSource, SourceError};
pub use crate::stats::{RunStats, VideoStats};

/// Batch ingestion pipeline; see the crate docs for the run model.
pub struct IngestionPipeline {
    cfg: PipelineConfig,
    embedder: Arc<dyn EmbeddingModel>,
    source: Box<dyn FrameSource>,
    sink: Box<dyn AssetSink>,
    detector: DuplicateDetector,
    store: VectorStore,
    stats: RunStats,
    processed: HashSet<String>,
}

impl IngestionPipeline {
    /// Assemble a pipeline from its collaborators.
    ///
    /// Fails fast on configuration problems, including a dimension
    /// disagreement between the embedding model, the duplicate detector,
    /// and the store.
    pub fn new(
        cfg: PipelineConfig,
        embedder: Arc<dyn EmbeddingModel>,
        source: Box<dyn FrameSource>,
        sink: Box<dyn AssetSink>,
        store: VectorStore,
    ) -> Result<Self, PipelineError> {
        cfg.validate()?;
        if embedder.dim() != cfg.dedup.dim {
            return Err(ConfigError::Invalid(format!(
                "embedder dim {} != dedup dim {}",
                embedder.dim(),
                cfg.dedup.dim
            ))
            .into());
        }
        if store.dim() != cfg.dedup.dim {
            return Err(ConfigError::Invalid(format!(
                "store dim {} != dedup dim {}",
                store.dim(),
                cfg.dedup.dim
            ))
            .into());
        }

        let detector = DuplicateDetector::new(cfg.dedup.clone())?;
        Ok(Self {
            cfg,
            embedder,
            source,
            sink,
            detector,
            store,
            stats: RunStats::default(),
            processed: HashSet::new(),
        })
    }

    /// Ingest a single video source.
    ///
    /// A video name already seen in this run is a no-op. Errors returned
    /// here are video-scoped; [`ingest_all`](Self::ingest_all) catches
    /// them and moves on, and direct callers may do the same without
    /// losing committed store state.
    pub fn ingest_video(&mut self, path: &Path) -> Result<VideoStats, PipelineError> {
        let video_name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => {
                return Err(SourceError::Open {
                    path: path.to_path_buf(),
                    reason: "path has no file name".to_string(),
                }
                .into())
            }
        };

        if self.processed.contains(&video_name) {
            warn!(video = %video_name, "video already processed this run, skipping");
            return Ok(VideoStats::default());
        }

        let span = tracing::span!(Level::INFO, "pipeline.ingest_video", video = %video_name);
        let _guard = span.enter();
        let start = Instant::now();

        // Duplicate suppression is judged only within a video's own history.
        self.detector.reset();
        let mut video = VideoStats::default();
        let mut embeddings_batch: Vec<Vec<f32>> = Vec::new();
        let mut records_batch: Vec<FrameRecord> = Vec::new();

        let frames = self.source.extract(path, self.cfg.extraction_fps)?;
        info!(frames = frames.len(), "frames_extracted");

        for (frame_index, (frame, timestamp)) in frames.into_iter().enumerate() {
            video.frames_extracted += 1;

            let embedding = match self.embedder.embed_image(&frame) {
                Ok(embedding) => embedding,
                Err(err) => {
                    warn!(frame_index, error = %err, "embedding failed, dropping frame");
                    video.frames_failed += 1;
                    continue;
                }
            };

            let embedding = match self.detector.evaluate(&frame, embedding)? {
                Verdict::Duplicate => {
                    video.duplicates_detected += 1;
                    continue;
                }
                Verdict::Unique(embedding) => embedding,
            };

            let asset_name = format!("{video_name}_frame_{frame_index:05}.jpg");
            let asset_path = self.cfg.frames_dir.join(&asset_name);
            if let Err(err) = self.sink.save(&frame, &asset_path) {
                warn!(frame_index, error = %err, "asset save failed, dropping frame");
                video.frames_failed += 1;
                continue;
            }

            embeddings_batch.push(embedding);
            records_batch.push(FrameRecord {
                frame_index: frame_index as u64,
                video_name: video_name.clone(),
                timestamp,
                frame_path: asset_name,
            });
            video.frames_stored += 1;

            if embeddings_batch.len() >= self.cfg.batch_size {
                self.flush_batch(&mut embeddings_batch, &mut records_batch)?;
            }
        }

        self.flush_batch(&mut embeddings_batch, &mut records_batch)?;

        let elapsed_millis = start.elapsed().as_millis();
        info!(
            frames_extracted = video.frames_extracted,
            duplicates_detected = video.duplicates_detected,
            frames_stored = video.frames_stored,
            frames_failed = video.frames_failed,
            elapsed_millis,
            "video_ingested"
        );

        self.processed.insert(video_name);
        self.stats.absorb(&video);
        Ok(video)
    }

    /// Ingest every video under `dir` whose name carries one of the
    /// allowed extensions, recursively.
    ///
    /// Each failing video is logged and skipped; the run continues with
    /// the remaining sources.
    pub fn ingest_all(&mut self, dir: &Path, extensions: &[String]) -> Result<(), PipelineError> {
        info!(dir = %dir.display(), ?extensions, "scanning for video sources");
        let sources = collect_sources(dir, extensions).map_err(|e| SourceError::Open {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        if sources.is_empty() {
            warn!(dir = %dir.display(), "no video sources found");
            return Ok(());
        }
        info!(count = sources.len(), "video sources found");

        for source_path in &sources {
            if let Err(err) = self.ingest_video(source_path) {
                error!(
                    video = %source_path.display(),
                    error = %err,
                    "skipping video after failure"
                );
            }
        }

        info!(
            frames_extracted = self.stats.frames_extracted,
            duplicates_detected = self.stats.duplicates_detected,
            frames_stored = self.stats.frames_stored,
            frames_failed = self.stats.frames_failed,
            videos_processed = self.stats.videos_processed,
            "ingestion_run_summary"
        );
        Ok(())
    }

    /// Persist the store, unless this run stored nothing.
    ///
    /// Never called implicitly; the caller decides when a run is done. A
    /// failed persist escalates.
    pub fn finalize(&mut self) -> Result<(), PipelineError> {
        if self.stats.frames_stored == 0 {
            warn!("no new frames stored this run, skipping persist");
            return Ok(());
        }
        info!(
            frames_stored = self.stats.frames_stored,
            "persisting vector store"
        );
        self.store.persist()?;
        Ok(())
    }

    /// Cumulative counters for the run so far.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Tear the pipeline down, handing the store back to the caller.
    pub fn into_store(self) -> VectorStore {
        self.store
    }

    fn flush_batch(
        &mut self,
        embeddings: &mut Vec<Vec<f32>>,
        records: &mut Vec<FrameRecord>,
    ) -> Result<(), PipelineError> {
        if embeddings.is_empty() {
            return Ok(());
        }
        self.store
            .add(std::mem::take(embeddings), std::mem::take(records))?;
        Ok(())
    }
}

/// Recursively collect ingestion sources under `dir`.
///
/// A source is any entry (file or directory) whose name ends with one of
/// the allowed extensions, compared case-insensitively. Matching
/// directories are sources themselves (image-sequence clips) and are not
/// descended into. Results are sorted for a deterministic run order.
fn collect_sources(dir: &Path, extensions: &[String]) -> std::io::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let path = entry?.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_ascii_lowercase(),
                None => continue,
            };
            let matches = extensions
                .iter()
                .any(|ext| name.ends_with(&ext.to_ascii_lowercase()));

            if matches {
                sources.push(path);
            } else if path.is_dir() {
                pending.push(path);
            }
        }
    }

    sources.sort();
    Ok(sources)
}
