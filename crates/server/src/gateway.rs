//! Search gateway: free-text queries in, public frame hits out.
//!
//! Consumes [`VectorStore::search`] results and maps them to the records
//! the API exposes. The read path fails open: when the store is empty or
//! the query embedding cannot be produced, the result is an empty list,
//! never an error. Only a genuine store failure escalates.

use std::sync::Arc;

use embed::EmbeddingModel;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use store::{StoreError, VectorStore};
use tracing::{info, warn};

/// Characters escaped inside a frame path segment. Slashes and the usual
/// unreserved URL characters pass through untouched.
const FRAME_PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'.')
    .remove(b'_')
    .remove(b'-')
    .remove(b'~');

/// One public search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Absolute URL of the matching frame image.
    pub image_url: String,
    /// Inner-product similarity of the frame to the query, in `[-1, 1]`.
    pub similarity: f32,
}

/// Maps store search results to public-facing records.
pub struct SearchGateway {
    store: Arc<VectorStore>,
    embedder: Arc<dyn EmbeddingModel>,
    base_url: String,
}

impl SearchGateway {
    pub fn new(
        store: Arc<VectorStore>,
        embedder: Arc<dyn EmbeddingModel>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            store,
            embedder,
            base_url,
        }
    }

    /// Search stored frames for the free-text `query`.
    ///
    /// Ordered descending by similarity, at most `top_k` hits.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, StoreError> {
        if self.store.is_empty() {
            warn!("search requested against an empty index");
            return Ok(Vec::new());
        }

        let query_embedding = match self.embedder.embed_text(query) {
            Ok(embedding) => embedding,
            Err(err) => {
                // Fail open: availability over surfacing read-path errors.
                warn!(query = %query, error = %err, "query embedding failed, returning empty results");
                return Ok(Vec::new());
            }
        };

        let results = self.store.search(&query_embedding, top_k)?;
        let hits: Vec<SearchHit> = results
            .into_iter()
            .map(|(record, score)| SearchHit {
                image_url: self.frame_url(&record.frame_path),
                similarity: score,
            })
            .collect();

        info!(query = %query, hits = hits.len(), "search_completed");
        Ok(hits)
    }

    /// Number of frames currently indexed.
    pub fn indexed_frames(&self) -> usize {
        self.store.len()
    }

    fn frame_url(&self, frame_path: &str) -> String {
        let encoded = utf8_percent_encode(frame_path, FRAME_PATH_SET);
        format!("{}/static/frames/{}", self.base_url, encoded)
    }
}
