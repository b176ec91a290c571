//! LRU cache for text-query embeddings.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use image::RgbImage;
use lru::LruCache;
use tracing::trace;

use crate::{EmbedError, EmbeddingModel};

/// Wraps an [`EmbeddingModel`] with an LRU cache keyed by query text.
///
/// The read path sees the same free-text queries over and over; caching
/// their embeddings avoids re-running the model. Image embedding is passed
/// through uncached: every ingested frame is distinct by construction.
pub struct CachingEmbedder {
    inner: Arc<dyn EmbeddingModel>,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl CachingEmbedder {
    pub fn new(inner: Arc<dyn EmbeddingModel>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl EmbeddingModel for CachingEmbedder {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn embed_image(&self, frame: &RgbImage) -> Result<Vec<f32>, EmbedError> {
        self.inner.embed_image(frame)
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        {
            let mut cache = self
                .cache
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(vector) = cache.get(text) {
                trace!(query = %text, "query_embedding_cache_hit");
                return Ok(vector.clone());
            }
        }

        let vector = self.inner.embed_text(text)?;
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.put(text.to_string(), vector.clone());
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts inner calls so the tests can observe cache behavior.
    struct CountingModel {
        dim: usize,
        text_calls: AtomicUsize,
    }

    impl EmbeddingModel for CountingModel {
        fn dim(&self) -> usize {
            self.dim
        }

        fn embed_image(&self, _frame: &RgbImage) -> Result<Vec<f32>, EmbedError> {
            Ok(vec![1.0; self.dim])
        }

        fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            self.text_calls.fetch_add(1, Ordering::SeqCst);
            let mut v = vec![0.0; self.dim];
            v[text.len() % self.dim] = 1.0;
            Ok(v)
        }
    }

    #[test]
    fn repeated_query_hits_cache() {
        let inner = Arc::new(CountingModel {
            dim: 8,
            text_calls: AtomicUsize::new(0),
        });
        let cached = CachingEmbedder::new(inner.clone(), 16);

        let first = cached.embed_text("query").unwrap();
        let second = cached.embed_text("query").unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.text_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn distinct_queries_each_invoke_model() {
        let inner = Arc::new(CountingModel {
            dim: 8,
            text_calls: AtomicUsize::new(0),
        });
        let cached = CachingEmbedder::new(inner.clone(), 16);

        cached.embed_text("one").unwrap();
        cached.embed_text("two").unwrap();

        assert_eq!(inner.text_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn eviction_respects_capacity() {
        let inner = Arc::new(CountingModel {
            dim: 4,
            text_calls: AtomicUsize::new(0),
        });
        let cached = CachingEmbedder::new(inner.clone(), 1);

        cached.embed_text("a").unwrap();
        cached.embed_text("b").unwrap(); // evicts "a"
        cached.embed_text("a").unwrap(); // recomputed

        assert_eq!(inner.text_calls.load(Ordering::SeqCst), 3);
    }
}
