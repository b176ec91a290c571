//! # Framesift Vector Store
//!
//! Persistent, append-only collection of (embedding, frame record) pairs
//! with exact inner-product similarity search and a save/load round-trip.
//!
//! ## Contract
//!
//! - **Append-only**: entries are never reordered, mutated, or deleted; an
//!   entry's ordinal position is its permanent identity.
//! - **Paired lengths**: every [`VectorStore::add`] appends embeddings and
//!   records pairwise, so `vectors.len() == records.len()` holds before and
//!   after each operation committed through the API.
//! - **Inner product**: embeddings are unit-norm by their producer, so the
//!   inner product used for scoring equals cosine similarity.
//! - **Explicit persistence**: nothing is written until
//!   [`VectorStore::persist`] is called. The two on-disk artifacts
//!   (`vectors.bin`, `metadata.json`) are written sequentially, not
//!   transactionally; a crash between the writes is an accepted limitation.
//!
//! Loading is forgiving about the metadata artifact: malformed metadata is
//! logged and replaced with an empty set rather than failing startup. The
//! degraded state (vectors without records) is tolerated by the search
//! path, which skips indices that have no record.
//!
//! ## Example
//!
//! ```no_run
//! use store::{FrameRecord, VectorStore};
//!
//! let mut store = VectorStore::open("data/index", 4)?;
//! store.add(
//!     vec![vec![1.0, 0.0, 0.0, 0.0]],
//!     vec![FrameRecord {
//!         frame_index: 0,
//!         video_name: "clip.mp4".into(),
//!         timestamp: 0.0,
//!         frame_path: "clip.mp4_frame_00000.jpg".into(),
//!     }],
//! )?;
//! let hits = store.search(&[1.0, 0.0, 0.0, 0.0], 4)?;
//! store.persist()?;
//! # Ok::<(), store::StoreError>(())
//! ```

mod persist;
mod search;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::persist::StoredVectors;

/// Bump this value whenever the on-disk vector artifact layout changes.
pub const STORE_SCHEMA_VERSION: u16 = 1;

/// File name of the vector artifact inside the index directory.
pub const VECTORS_FILE: &str = "vectors.bin";

/// File name of the metadata artifact inside the index directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Metadata for one accepted frame, stored at the same ordinal position as
/// its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Index of the frame within its video's sampled frame sequence.
    pub frame_index: u64,
    /// File name of the source video.
    pub video_name: String,
    /// Timestamp of the frame within the video, in seconds.
    pub timestamp: f64,
    /// Path of the saved frame asset, relative to the frames directory.
    pub frame_path: String,
}

/// Errors produced by the vector store.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// A vector's length disagrees with the configured dimension.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A batch supplied different numbers of embeddings and records.
    #[error("batch mismatch: {vectors} vectors but {records} records")]
    BatchMismatch { vectors: usize, records: usize },

    /// Filesystem failure while reading or writing an artifact.
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),

    /// The vector artifact could not be encoded for persistence.
    #[error("failed to encode vector artifact: {0}")]
    Encode(String),

    /// The vector artifact on disk is unreadable. Unlike metadata, a
    /// corrupt vector artifact is fatal: there is nothing to degrade to.
    #[error("failed to decode vector artifact: {0}")]
    Decode(String),
}

/// Persistent, append-only pairing of embeddings and frame records.
pub struct VectorStore {
    dir: PathBuf,
    dim: usize,
    vectors: Vec<Vec<f32>>,
    records: Vec<FrameRecord>,
}

impl VectorStore {
    /// Open the store rooted at `dir` with embedding dimension `dim`.
    ///
    /// Loads the persisted artifacts when present, otherwise starts empty.
    /// A malformed metadata artifact is logged and replaced with an empty
    /// set; a malformed vector artifact is a fatal [`StoreError::Decode`].
    pub fn open<P: AsRef<Path>>(dir: P, dim: usize) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let vectors = Self::load_vectors(&dir, dim)?;
        let records = Self::load_records(&dir);

        if records.len() != vectors.len() {
            warn!(
                vectors = vectors.len(),
                records = records.len(),
                "store loaded with unpaired artifacts; search will skip entries without records"
            );
        }

        info!(
            dir = %dir.display(),
            dim,
            vectors = vectors.len(),
            "vector_store_opened"
        );

        Ok(Self {
            dir,
            dim,
            vectors,
            records,
        })
    }

    fn load_vectors(dir: &Path, dim: usize) -> Result<Vec<Vec<f32>>, StoreError> {
        let path = dir.join(VECTORS_FILE);
        if !path.exists() {
            info!(path = %path.display(), "no vector artifact found, starting empty");
            return Ok(Vec::new());
        }

        let stored = StoredVectors::read(&path)?;
        if stored.dim != dim {
            return Err(StoreError::DimensionMismatch {
                expected: dim,
                got: stored.dim,
            });
        }
        info!(path = %path.display(), vectors = stored.vectors.len(), "vector_artifact_loaded");
        Ok(stored.vectors)
    }

    fn load_records(dir: &Path) -> Vec<FrameRecord> {
        let path = dir.join(METADATA_FILE);
        if !path.exists() {
            info!(path = %path.display(), "no metadata artifact found, starting empty");
            return Vec::new();
        }

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "metadata artifact unreadable, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<FrameRecord>>(&raw) {
            Ok(records) => {
                info!(path = %path.display(), records = records.len(), "metadata_artifact_loaded");
                records
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "metadata artifact malformed, starting empty");
                Vec::new()
            }
        }
    }

    /// Append a batch of embeddings and their records.
    ///
    /// An empty batch is a no-op with a warning, never an error. Every
    /// vector must have the configured dimension and the two slices must
    /// be the same length; on failure nothing is appended.
    pub fn add(
        &mut self,
        embeddings: Vec<Vec<f32>>,
        records: Vec<FrameRecord>,
    ) -> Result<(), StoreError> {
        if embeddings.is_empty() && records.is_empty() {
            warn!("add called with an empty batch");
            return Ok(());
        }
        if embeddings.len() != records.len() {
            return Err(StoreError::BatchMismatch {
                vectors: embeddings.len(),
                records: records.len(),
            });
        }
        for vector in &embeddings {
            if vector.len() != self.dim {
                return Err(StoreError::DimensionMismatch {
                    expected: self.dim,
                    got: vector.len(),
                });
            }
        }

        let added = embeddings.len();
        self.vectors.extend(embeddings);
        self.records.extend(records);

        debug!(added, total = self.vectors.len(), "embeddings_added");
        Ok(())
    }

    /// Write both artifacts so a subsequent [`VectorStore::open`]
    /// reproduces an equivalent store.
    ///
    /// The vector artifact is written first, then the metadata artifact;
    /// the two writes are not atomic as a pair.
    pub fn persist(&self) -> Result<(), StoreError> {
        let vectors_path = self.dir.join(VECTORS_FILE);
        info!(path = %vectors_path.display(), vectors = self.vectors.len(), "persisting vector artifact");
        StoredVectors {
            schema_version: STORE_SCHEMA_VERSION,
            dim: self.dim,
            vectors: self.vectors.clone(),
        }
        .write(&vectors_path)?;

        let metadata_path = self.dir.join(METADATA_FILE);
        info!(path = %metadata_path.display(), records = self.records.len(), "persisting metadata artifact");
        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| StoreError::Encode(e.to_string()))?;
        fs::write(&metadata_path, json)?;

        info!("vector_store_persisted");
        Ok(())
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True when the store holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The configured embedding dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The index directory this store persists into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All stored records, in insertion order.
    pub fn records(&self) -> &[FrameRecord] {
        &self.records
    }

    pub(crate) fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(index: u64, video: &str) -> FrameRecord {
        FrameRecord {
            frame_index: index,
            video_name: video.to_string(),
            timestamp: index as f64 * 0.1,
            frame_path: format!("{video}_frame_{index:05}.jpg"),
        }
    }

    #[test]
    fn open_empty_directory_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path(), 4).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.dim(), 4);
    }

    #[test]
    fn add_keeps_lengths_paired_and_entries_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = VectorStore::open(dir.path(), 2).unwrap();

        store
            .add(vec![vec![1.0, 0.0]], vec![record(0, "a.mp4")])
            .unwrap();
        let first_vector = store.vectors()[0].clone();
        let first_record = store.records()[0].clone();

        store
            .add(
                vec![vec![0.0, 1.0], vec![0.6, 0.8]],
                vec![record(1, "a.mp4"), record(2, "a.mp4")],
            )
            .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.records().len(), store.len());
        // Previously added entries are untouched by later appends.
        assert_eq!(store.vectors()[0], first_vector);
        assert_eq!(store.records()[0], first_record);
    }

    #[test]
    fn empty_batch_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let mut store = VectorStore::open(dir.path(), 2).unwrap();
        store.add(Vec::new(), Vec::new()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = VectorStore::open(dir.path(), 3).unwrap();
        let err = store
            .add(vec![vec![1.0, 0.0]], vec![record(0, "a.mp4")])
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::DimensionMismatch {
                expected: 3,
                got: 2
            }
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn unbalanced_batch_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = VectorStore::open(dir.path(), 2).unwrap();
        let err = store.add(vec![vec![1.0, 0.0]], Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::BatchMismatch {
                vectors: 1,
                records: 0
            }
        ));
    }

    #[test]
    fn persist_then_open_round_trips() {
        let dir = TempDir::new().unwrap();
        let query = [1.0f32, 0.0];

        let mut store = VectorStore::open(dir.path(), 2).unwrap();
        store
            .add(
                vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.6, 0.8]],
                vec![record(0, "a.mp4"), record(1, "a.mp4"), record(2, "b.mp4")],
            )
            .unwrap();
        let before = store.search(&query, 3).unwrap();
        store.persist().unwrap();
        drop(store);

        let reopened = VectorStore::open(dir.path(), 2).unwrap();
        assert_eq!(reopened.len(), 3);
        assert_eq!(reopened.records()[2], record(2, "b.mp4"));

        let after = reopened.search(&query, 3).unwrap();
        assert_eq!(before.len(), after.len());
        for ((rec_a, score_a), (rec_b, score_b)) in before.iter().zip(after.iter()) {
            assert_eq!(rec_a, rec_b);
            assert!((score_a - score_b).abs() < 1e-5);
        }
    }

    #[test]
    fn persist_writes_both_artifacts() {
        let dir = TempDir::new().unwrap();
        let mut store = VectorStore::open(dir.path(), 2).unwrap();
        store
            .add(vec![vec![1.0, 0.0]], vec![record(0, "a.mp4")])
            .unwrap();
        store.persist().unwrap();

        assert!(dir.path().join(VECTORS_FILE).exists());
        assert!(dir.path().join(METADATA_FILE).exists());
    }

    #[test]
    fn malformed_metadata_degrades_to_empty_records() {
        let dir = TempDir::new().unwrap();
        let mut store = VectorStore::open(dir.path(), 2).unwrap();
        store
            .add(vec![vec![1.0, 0.0]], vec![record(0, "a.mp4")])
            .unwrap();
        store.persist().unwrap();
        drop(store);

        std::fs::write(dir.path().join(METADATA_FILE), "{not json").unwrap();

        let degraded = VectorStore::open(dir.path(), 2).unwrap();
        // Vectors load, records degrade to empty, startup does not fail.
        assert_eq!(degraded.len(), 1);
        assert!(degraded.records().is_empty());
        // Search skips entries that have no record instead of crashing.
        assert!(degraded.search(&[1.0, 0.0], 1).unwrap().is_empty());
    }

    #[test]
    fn non_array_metadata_degrades_to_empty_records() {
        let dir = TempDir::new().unwrap();
        let mut store = VectorStore::open(dir.path(), 2).unwrap();
        store
            .add(vec![vec![1.0, 0.0]], vec![record(0, "a.mp4")])
            .unwrap();
        store.persist().unwrap();
        drop(store);

        std::fs::write(dir.path().join(METADATA_FILE), "{\"results\": 3}").unwrap();

        let degraded = VectorStore::open(dir.path(), 2).unwrap();
        assert!(degraded.records().is_empty());
    }

    #[test]
    fn corrupt_vector_artifact_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut store = VectorStore::open(dir.path(), 2).unwrap();
        store
            .add(vec![vec![1.0, 0.0]], vec![record(0, "a.mp4")])
            .unwrap();
        store.persist().unwrap();
        drop(store);

        std::fs::write(dir.path().join(VECTORS_FILE), b"garbage").unwrap();

        assert!(matches!(
            VectorStore::open(dir.path(), 2),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn reopening_with_wrong_dimension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = VectorStore::open(dir.path(), 2).unwrap();
        store
            .add(vec![vec![1.0, 0.0]], vec![record(0, "a.mp4")])
            .unwrap();
        store.persist().unwrap();
        drop(store);

        assert!(matches!(
            VectorStore::open(dir.path(), 3),
            Err(StoreError::DimensionMismatch { .. })
        ));
    }
}
