//! Shared application state.

use std::sync::Arc;

use embed::{build_embedder, EmbeddingModel};
use store::VectorStore;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::gateway::SearchGateway;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Search gateway (shared across requests)
    pub gateway: Arc<SearchGateway>,
}

impl ServerState {
    /// Create new server state: build the embedding capability once, open
    /// the persisted index, and wire the gateway.
    ///
    /// The store is opened read-only in spirit: the server never mutates
    /// it. Ingestion runs in a separate process; the two are never live
    /// against the same directory at once.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let embedder = build_embedder(&config.embedding)?;
        let store = Arc::new(VectorStore::open(&config.index_dir, config.embedding.dim)?);
        Self::with_parts(config, store, embedder)
    }

    /// Assemble state from pre-built parts; used by tests to inject a
    /// seeded store or a specific embedder.
    pub fn with_parts(
        config: ServerConfig,
        store: Arc<VectorStore>,
        embedder: Arc<dyn EmbeddingModel>,
    ) -> ServerResult<Self> {
        let gateway = Arc::new(SearchGateway::new(
            store,
            embedder,
            config.public_base_url(),
        ));
        Ok(Self {
            config: Arc::new(config),
            gateway,
        })
    }
}
