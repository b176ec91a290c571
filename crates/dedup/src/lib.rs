//! # Framesift Duplicate Detection
//!
//! Per-video, stateful duplicate decision engine. Sampled frames arrive in
//! order with their embeddings; the detector answers one question per
//! frame: is this visually or semantically a repeat of something this
//! video already contributed?
//!
//! ## Stages
//!
//! Evaluation runs three ordered, short-circuiting stages. The first
//! positive signal wins; no later stage can override an earlier stage's
//! verdict in either direction.
//!
//! 1. **Hash stage**: perceptual-hash distance against the last
//!    [`RECENT_HASH_CHECK_COUNT`] accepted frames. Catches back-to-back
//!    near-identical frames for the cost of a few XORs.
//! 2. **Windowed similarity stage**: exact rescaled cosine similarity
//!    against the last `window_size` accepted embeddings. Catches recent
//!    semantic repeats the hash is too coarse for.
//! 3. **Approximate lookback stage**: once more than `window_size`
//!    embeddings are accepted, an ANN index over *all* of the video's
//!    accepted embeddings is consulted for top-[`LOOKBACK_K`] candidates,
//!    which are then re-scored exactly. The index is rebuilt every
//!    [`LOOKBACK_REBUILD_EVERY`] accepted embeddings, eagerly rather than
//!    synchronously: a just-accepted embedding may be invisible to this
//!    stage until the next rebuild boundary. That staleness is a
//!    deliberate trade; exact recall is guaranteed only by the first two
//!    stages.
//!
//! A frame that survives all three stages is recorded into the detector's
//! state and returned as [`Verdict::Unique`].
//!
//! ## Lifecycle
//!
//! State is strictly per video: call [`DuplicateDetector::reset`] before
//! each new video so duplicates are judged only within a video's own
//! history. Nothing here is persisted and nothing does I/O.

mod ann;
mod config;

use std::collections::VecDeque;

use image::RgbImage;
use phash::PerceptualHash;
use tracing::{debug, trace};

use crate::ann::LookbackIndex;
pub use crate::config::{DedupConfig, DedupError};

/// How many of the most recently accepted hashes the hash stage consults.
pub const RECENT_HASH_CHECK_COUNT: usize = 5;

/// Number of approximate neighbors retrieved by the lookback stage.
pub const LOOKBACK_K: usize = 10;

/// The lookback index is rebuilt every this many accepted embeddings.
pub const LOOKBACK_REBUILD_EVERY: usize = 100;

/// Outcome of evaluating one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The frame repeats earlier content of this video; drop it.
    Duplicate,
    /// The frame is new; its embedding is handed back for storage.
    Unique(Vec<f32>),
}

/// Rescale a unit-norm inner product from `[-1, 1]` onto `[0, 1]`.
#[inline]
pub fn rescaled_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    (dot + 1.0) / 2.0
}

/// Per-video duplicate detector; see the crate docs for the stage design.
pub struct DuplicateDetector {
    cfg: DedupConfig,
    recent_hashes: VecDeque<PerceptualHash>,
    embeddings: Vec<Vec<f32>>,
    lookback: Option<LookbackIndex>,
}

impl DuplicateDetector {
    pub fn new(cfg: DedupConfig) -> Result<Self, DedupError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            recent_hashes: VecDeque::with_capacity(RECENT_HASH_CHECK_COUNT),
            embeddings: Vec::new(),
            lookback: None,
        })
    }

    /// Evaluate one frame with its embedding.
    ///
    /// Fails only when `embedding` disagrees with the configured
    /// dimension; the decision itself is pure in-memory work.
    pub fn evaluate(
        &mut self,
        frame: &RgbImage,
        embedding: Vec<f32>,
    ) -> Result<Verdict, DedupError> {
        let hash = PerceptualHash::compute(frame);
        self.evaluate_hashed(hash, embedding)
    }

    /// Evaluate with a precomputed perceptual hash.
    pub fn evaluate_hashed(
        &mut self,
        hash: PerceptualHash,
        embedding: Vec<f32>,
    ) -> Result<Verdict, DedupError> {
        if embedding.len() != self.cfg.dim {
            return Err(DedupError::DimensionMismatch {
                expected: self.cfg.dim,
                got: embedding.len(),
            });
        }

        // Stage 1: perceptual hash against the recent accepted frames.
        for recent in &self.recent_hashes {
            if hash.distance(recent) < self.cfg.hash_threshold {
                trace!(distance = hash.distance(recent), "duplicate_by_hash");
                return Ok(Verdict::Duplicate);
            }
        }

        // Stage 2: exact similarity against the recent window.
        let window_start = self.embeddings.len().saturating_sub(self.cfg.window_size);
        if self.similar_to_any(&embedding, self.embeddings[window_start..].iter()) {
            trace!("duplicate_by_window");
            return Ok(Verdict::Duplicate);
        }

        // Stage 3: approximate lookback over the whole accepted history.
        if self.embeddings.len() > self.cfg.window_size {
            if self.lookback.is_none() || self.embeddings.len() % LOOKBACK_REBUILD_EVERY == 0 {
                debug!(
                    accepted = self.embeddings.len(),
                    "rebuilding lookback index"
                );
                self.lookback = Some(LookbackIndex::build(&self.embeddings));
            }

            if let Some(lookback) = &self.lookback {
                let candidates = lookback.search(&embedding, LOOKBACK_K);
                let candidate_vectors = candidates
                    .iter()
                    .filter_map(|&idx| self.embeddings.get(idx));
                if self.similar_to_any(&embedding, candidate_vectors) {
                    trace!("duplicate_by_lookback");
                    return Ok(Verdict::Duplicate);
                }
            }
        }

        // Not a duplicate: record it and hand the embedding back.
        if self.recent_hashes.len() == RECENT_HASH_CHECK_COUNT {
            self.recent_hashes.pop_front();
        }
        self.recent_hashes.push_back(hash);
        self.embeddings.push(embedding.clone());

        Ok(Verdict::Unique(embedding))
    }

    /// Forget all per-video state. Must be called once per new video.
    pub fn reset(&mut self) {
        self.recent_hashes.clear();
        self.embeddings.clear();
        self.lookback = None;
    }

    /// Number of embeddings accepted for the current video.
    pub fn accepted(&self) -> usize {
        self.embeddings.len()
    }

    fn similar_to_any<'a, I>(&self, embedding: &[f32], others: I) -> bool
    where
        I: Iterator<Item = &'a Vec<f32>>,
    {
        for other in others {
            if rescaled_similarity(embedding, other) > self.cfg.similarity_threshold {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(dim: usize, window_size: usize) -> DuplicateDetector {
        DuplicateDetector::new(DedupConfig {
            dim,
            hash_threshold: 5,
            similarity_threshold: 0.95,
            window_size,
        })
        .unwrap()
    }

    fn unit(dim: usize, axis: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[axis] = 1.0;
        v
    }

    /// Hashes with pairwise distance 10, comfortably above the threshold.
    fn distinct_hash(i: usize) -> PerceptualHash {
        assert!(i < 12, "only 12 distinct test hashes available");
        PerceptualHash::from_bits(0b11111u64 << (5 * i))
    }

    /// A unit vector whose dot with `unit(dim, 0)` is exactly `dot`.
    fn vector_with_dot(dim: usize, dot: f32) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[0] = dot;
        v[1] = (1.0 - dot * dot).sqrt();
        v
    }

    #[test]
    fn rescaled_similarity_maps_onto_unit_interval() {
        let a = unit(4, 0);
        assert!((rescaled_similarity(&a, &a) - 1.0).abs() < 1e-6);
        assert!((rescaled_similarity(&a, &unit(4, 1)) - 0.5).abs() < 1e-6);
        let neg = vec![-1.0, 0.0, 0.0, 0.0];
        assert!(rescaled_similarity(&a, &neg).abs() < 1e-6);
    }

    #[test]
    fn close_hash_is_duplicate() {
        let mut det = detector(4, 10);
        let base = PerceptualHash::from_bits(0xF0F0);

        let first = det
            .evaluate_hashed(base, unit(4, 0))
            .expect("first frame evaluates");
        assert!(matches!(first, Verdict::Unique(_)));

        // Distance 3 < threshold 5: duplicate, even though the embedding is
        // orthogonal to everything accepted. The hash stage wins first.
        let near = PerceptualHash::from_bits(0xF0F0 ^ 0b111);
        let verdict = det.evaluate_hashed(near, unit(4, 1)).unwrap();
        assert_eq!(verdict, Verdict::Duplicate);
        assert_eq!(det.accepted(), 1);
    }

    #[test]
    fn hash_distance_at_threshold_passes() {
        let mut det = detector(4, 10);
        let base = PerceptualHash::from_bits(0xF0F0);
        det.evaluate_hashed(base, unit(4, 0)).unwrap();

        // Distance exactly 5 is not below the threshold; the later stages
        // then judge the (orthogonal) embedding unique.
        let at_threshold = PerceptualHash::from_bits(0xF0F0 ^ 0b11111);
        let verdict = det.evaluate_hashed(at_threshold, unit(4, 1)).unwrap();
        assert!(matches!(verdict, Verdict::Unique(_)));
    }

    #[test]
    fn hash_stage_only_consults_recent_history() {
        let mut det = detector(8, 10);
        let old = PerceptualHash::from_bits(0xABCD);
        det.evaluate_hashed(old, unit(8, 0)).unwrap();

        // Push five more accepted frames; `old` falls out of the bounded
        // recent-hash list.
        for i in 1..=RECENT_HASH_CHECK_COUNT {
            det.evaluate_hashed(distinct_hash(i), unit(8, i)).unwrap();
        }

        // Same hash as `old`, orthogonal embedding: the hash stage no
        // longer sees it, and the embedding stages accept it.
        let verdict = det.evaluate_hashed(old, unit(8, 6)).unwrap();
        assert!(matches!(verdict, Verdict::Unique(_)));
    }

    #[test]
    fn high_windowed_similarity_is_duplicate() {
        let mut det = detector(4, 10);
        det.evaluate_hashed(distinct_hash(0), unit(4, 0)).unwrap();

        // dot 0.94 → rescaled 0.97 > 0.95.
        let verdict = det
            .evaluate_hashed(distinct_hash(1), vector_with_dot(4, 0.94))
            .unwrap();
        assert_eq!(verdict, Verdict::Duplicate);
    }

    #[test]
    fn moderate_windowed_similarity_is_unique() {
        let mut det = detector(4, 10);
        det.evaluate_hashed(distinct_hash(0), unit(4, 0)).unwrap();

        // dot 0.80 → rescaled 0.90 ≤ 0.95.
        let verdict = det
            .evaluate_hashed(distinct_hash(1), vector_with_dot(4, 0.80))
            .unwrap();
        assert!(matches!(verdict, Verdict::Unique(_)));
        assert_eq!(det.accepted(), 2);
    }

    #[test]
    fn reset_gives_cross_video_independence() {
        let mut det = detector(4, 10);
        let hash = PerceptualHash::from_bits(0x1234);
        let embedding = unit(4, 0);

        det.evaluate_hashed(hash, embedding.clone()).unwrap();
        // Same frame again within the video: duplicate.
        assert_eq!(
            det.evaluate_hashed(hash, embedding.clone()).unwrap(),
            Verdict::Duplicate
        );

        det.reset();
        assert_eq!(det.accepted(), 0);

        // First appearance in the next video: unique again.
        let verdict = det.evaluate_hashed(hash, embedding).unwrap();
        assert!(matches!(verdict, Verdict::Unique(_)));
    }

    #[test]
    fn lookback_catches_repeats_beyond_the_window() {
        let mut det = detector(8, 1);
        det.evaluate_hashed(distinct_hash(0), unit(8, 0)).unwrap();
        det.evaluate_hashed(distinct_hash(1), unit(8, 1)).unwrap();

        // The window only holds the last embedding (axis 1), but the
        // lookback index covers the whole history and finds axis 0 again.
        let verdict = det.evaluate_hashed(distinct_hash(2), unit(8, 0)).unwrap();
        assert_eq!(verdict, Verdict::Duplicate);
    }

    #[test]
    fn lookback_snapshot_is_stale_until_next_rebuild() {
        let mut det = detector(8, 1);
        // Accept axes 0, 1; the lookback snapshot is built over these two
        // while evaluating axis 2.
        det.evaluate_hashed(distinct_hash(0), unit(8, 0)).unwrap();
        det.evaluate_hashed(distinct_hash(1), unit(8, 1)).unwrap();
        det.evaluate_hashed(distinct_hash(2), unit(8, 2)).unwrap();
        // Axis 3 is accepted after the snapshot: invisible to lookback.
        det.evaluate_hashed(distinct_hash(3), unit(8, 3)).unwrap();
        // Push axis 3 out of the window.
        det.evaluate_hashed(distinct_hash(4), unit(8, 4)).unwrap();

        // A repeat of axis 3: the window holds axis 4, the stale snapshot
        // holds axes 0..=1: nothing catches it. Accepted by design.
        let verdict = det.evaluate_hashed(distinct_hash(5), unit(8, 3)).unwrap();
        assert!(matches!(verdict, Verdict::Unique(_)));
    }

    #[test]
    fn wrong_dimension_is_an_error() {
        let mut det = detector(4, 10);
        let err = det
            .evaluate_hashed(distinct_hash(0), vec![1.0, 0.0])
            .unwrap_err();
        assert_eq!(
            err,
            DedupError::DimensionMismatch {
                expected: 4,
                got: 2
            }
        );
    }

    #[test]
    fn unique_verdict_returns_the_embedding() {
        let mut det = detector(4, 10);
        let embedding = unit(4, 0);
        match det.evaluate_hashed(distinct_hash(0), embedding.clone()) {
            Ok(Verdict::Unique(returned)) => assert_eq!(returned, embedding),
            other => panic!("expected Unique, got {other:?}"),
        }
    }
}
