//! Server initialization and routing
//!
//! Axum router construction, middleware stack, and the serve loop with
//! graceful shutdown.

use crate::config::ServerConfig;
use crate::routes::{api_info, health, not_found, search};
use crate::state::ServerState;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware.
///
/// Routes:
/// - `GET /` - service info
/// - `GET /health` - liveness probe
/// - `GET /api/v1/search` - free-text frame search
/// - `GET /static/frames/*` - saved frame assets
pub fn build_router(state: ServerState) -> Router {
    let cors = cors_layer(&state.config);
    let frames_service = ServeDir::new(&state.config.frames_dir);

    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/api/v1/search", get(search::search))
        .nest_service("/static/frames", frames_service)
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.allowed_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    }
}

/// Start the Framesift HTTP server.
///
/// Initializes structured logging, builds the shared state (embedding
/// capability + persisted index + gateway), and serves until SIGTERM or
/// Ctrl+C.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .json()
        .init();

    let state = ServerState::new(config.clone())?;
    let app = build_router(state);

    let addr: SocketAddr = config.socket_addr()?;
    tracing::info!(
        "Starting framesift server on {} (index: {}, frames: {})",
        addr,
        config.index_dir.display(),
        config.frames_dir.display()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
