//! Framesift Server - HTTP search API over the frame index
//!
//! Thin transport layer over the Framesift core. The heavy lifting
//! (embedding, vector search, result shaping) lives in the core crates;
//! this crate validates requests, schedules the blocking search work, and
//! maps internal error kinds to HTTP statuses in exactly one place
//! ([`error`]).
//!
//! # Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - liveness probe with index size
//! - `GET /api/v1/search?query=...&top_k=N` - free-text frame search
//! - `GET /static/frames/<path>` - saved frame assets
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! Serving and ingestion are separate processes by design: the server
//! opens the persisted index read-only at startup and never runs
//! concurrently with an ingestion run against the same directory.

pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use gateway::{SearchGateway, SearchHit};
pub use server::{build_router, start_server};
pub use state::ServerState;
