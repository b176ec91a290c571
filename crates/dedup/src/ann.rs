//! Approximate lookback index over a video's accepted embeddings.
//!
//! A snapshot HNSW graph built from the embeddings accepted so far.
//! Candidates it returns are *suggestions*: the detector re-scores every
//! candidate with the exact rescaled similarity, so the graph's distance
//! convention never leaks into the duplicate decision. The index is
//! rebuilt from scratch at the detector's rebuild boundaries and is
//! intentionally stale in between.

use hnsw_rs::prelude::*;

/// Number of neighbors per HNSW node.
const HNSW_M: usize = 16;

/// Candidate-list size during graph construction.
const HNSW_EF_CONSTRUCTION: usize = 200;

/// Candidate-list size during search.
const HNSW_EF_SEARCH: usize = 50;

/// Below this population an HNSW graph degenerates; every stored index is
/// returned as a candidate instead, which the exact re-scoring pass turns
/// into a plain linear scan.
const MIN_HNSW_POPULATION: usize = 10;

pub(crate) struct LookbackIndex {
    hnsw: Option<Hnsw<'static, f32, DistDot>>,
    len: usize,
}

impl LookbackIndex {
    /// Build a snapshot index over `embeddings` in their current order.
    pub(crate) fn build(embeddings: &[Vec<f32>]) -> Self {
        let len = embeddings.len();
        if len < MIN_HNSW_POPULATION {
            return Self { hnsw: None, len };
        }

        let nb_layer = 16.min((len as f32).ln().trunc() as usize);
        let hnsw = Hnsw::<f32, DistDot>::new(
            HNSW_M,
            len,
            nb_layer,
            HNSW_EF_CONSTRUCTION,
            DistDot {},
        );
        let data: Vec<(&Vec<f32>, usize)> = embeddings.iter().enumerate().map(|(i, v)| (v, i)).collect();
        hnsw.parallel_insert(&data);

        Self {
            hnsw: Some(hnsw),
            len,
        }
    }

    /// Number of embeddings covered by this snapshot.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Top-`k` approximate neighbor indices for `query`.
    ///
    /// Indices outside the snapshot's range are dropped here so callers
    /// can dereference the result without bounds anxiety.
    pub(crate) fn search(&self, query: &[f32], k: usize) -> Vec<usize> {
        match &self.hnsw {
            Some(hnsw) => hnsw
                .search(query, k, HNSW_EF_SEARCH)
                .into_iter()
                .map(|neighbour| neighbour.get_origin_id())
                .filter(|&idx| idx < self.len)
                .collect(),
            None => (0..self.len).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(dim: usize, axis: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[axis] = 1.0;
        v
    }

    #[test]
    fn small_population_returns_all_candidates() {
        let embeddings = vec![unit(4, 0), unit(4, 1), unit(4, 2)];
        let index = LookbackIndex::build(&embeddings);
        let mut candidates = index.search(&unit(4, 0), 10);
        candidates.sort_unstable();
        assert_eq!(candidates, vec![0, 1, 2]);
    }

    #[test]
    fn large_population_uses_graph_and_finds_neighbor() {
        let dim = 16;
        let mut embeddings: Vec<Vec<f32>> = (0..dim).map(|axis| unit(dim, axis)).collect();
        embeddings.push(unit(dim, 3)); // exact duplicate of index 3 at index 16

        let index = LookbackIndex::build(&embeddings);
        let candidates = index.search(&unit(dim, 3), 5);

        assert!(!candidates.is_empty());
        assert!(candidates.iter().all(|&idx| idx < embeddings.len()));
        // The duplicated direction must surface among the top candidates.
        assert!(candidates.contains(&3) || candidates.contains(&16));
    }

    #[test]
    fn snapshot_length_is_fixed_at_build_time() {
        let embeddings = vec![unit(4, 0), unit(4, 1)];
        let index = LookbackIndex::build(&embeddings);
        assert_eq!(index.len(), 2);
    }
}
