//! Exact inner-product retrieval over the stored vectors.

use std::cmp::Ordering;

use tracing::warn;

use crate::{FrameRecord, StoreError, VectorStore};

/// Inner product of two equal-length vectors. For unit-norm inputs this is
/// exactly their cosine similarity.
#[inline]
fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

impl VectorStore {
    /// Return the `k` stored entries most similar to `query`, descending
    /// by inner-product score.
    ///
    /// An empty store yields an empty result, never an error. Indices
    /// without a paired record (possible only after a degraded metadata
    /// load) are skipped and logged rather than propagated. Ties are broken
    /// by insertion order, keeping results deterministic.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<(FrameRecord, f32)>, StoreError> {
        if self.is_empty() {
            warn!("search called on an empty vector store");
            return Ok(Vec::new());
        }
        if query.len() != self.dim() {
            return Err(StoreError::DimensionMismatch {
                expected: self.dim(),
                got: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors()
            .iter()
            .enumerate()
            .map(|(idx, vector)| (idx, inner_product(query, vector)))
            .collect();

        scored.sort_unstable_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut results = Vec::with_capacity(k.min(scored.len()));
        for (idx, score) in scored.into_iter().take(k) {
            match self.records().get(idx) {
                Some(record) => results.push((record.clone(), score)),
                None => {
                    warn!(
                        index = idx,
                        records = self.records().len(),
                        "search hit an index without a record, skipping"
                    );
                }
            }
        }

        Ok(results)
    }
}
