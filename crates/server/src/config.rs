//! Server configuration, layered from file and environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use embed::EmbedConfig;
use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Public base URL used to build frame links; derived from the bind
    /// address when unset.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Directory holding the persisted vector index.
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,

    /// Directory holding saved frame assets, served under
    /// `/static/frames/`.
    #[serde(default = "default_frames_dir")]
    pub frames_dir: PathBuf,

    /// Embedding backend used for query embeddings.
    #[serde(default)]
    pub embedding: EmbedConfig,

    /// Result count when the request does not specify one.
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    /// Upper bound on the per-request result count.
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,

    /// Allowed CORS origins; `["*"]` allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            base_url: None,
            index_dir: default_index_dir(),
            frames_dir: default_frames_dir(),
            embedding: EmbedConfig::default(),
            default_top_k: default_top_k(),
            max_top_k: default_max_top_k(),
            allowed_origins: default_allowed_origins(),
            timeout_secs: default_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `framesift-server` file,
    /// overridden by `FRAMESIFT_SERVER__*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("framesift-server").required(false))
            .add_source(config::Environment::with_prefix("FRAMESIFT_SERVER").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Public base URL for frame links.
    pub fn public_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.bind_addr, self.port),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("data/index")
}

fn default_frames_dir() -> PathBuf {
    PathBuf::from("static/frames")
}

fn default_top_k() -> usize {
    4
}

fn default_max_top_k() -> usize {
    10
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}
