use crate::error::{ServerError, ServerResult};
use crate::gateway::SearchHit;
use crate::state::ServerState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Search request parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Text query to search for in video frames
    pub query: String,

    /// Number of results to return; defaults to the configured value.
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

/// Search for frames matching the query text.
///
/// Validation failures are 400s; an empty index or a failed query
/// embedding yields an empty result set with 200 (the gateway fails
/// open). The embedding call can block on a remote model, so it runs on
/// the blocking pool rather than a runtime worker.
pub async fn search(
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> ServerResult<impl IntoResponse> {
    if params.query.trim().is_empty() {
        return Err(ServerError::BadRequest("query must not be empty".into()));
    }

    let top_k = params.top_k.unwrap_or(state.config.default_top_k);
    if top_k == 0 || top_k > state.config.max_top_k {
        return Err(ServerError::BadRequest(format!(
            "top_k must be within 1..={}, got {top_k}",
            state.config.max_top_k
        )));
    }

    info!(query = %params.query, top_k, "processing search query");

    let gateway = state.gateway.clone();
    let query = params.query.clone();
    let results = tokio::task::spawn_blocking(move || gateway.search(&query, top_k))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;

    Ok(Json(SearchResponse { results }))
}
