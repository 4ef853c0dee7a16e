//! Server configuration.
//!
//! Read from the TOML file named by `$RESUMABLE_CONFIG`, or `resumable.toml`
//! in the working directory. Every field has a default, and a missing file
//! means all defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "RESUMABLE_CONFIG";

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Root for staging areas and assembled files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Chunk copies a single merge runs at once.
    #[serde(default = "default_merge_concurrency")]
    pub merge_concurrency: usize,

    /// Largest accepted `/upload` request body, in bytes.
    #[serde(default = "default_max_chunk_body")]
    pub max_chunk_body: usize,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_merge_concurrency() -> usize {
    resumable_transfer::DEFAULT_MERGE_CONCURRENCY
}

fn default_max_chunk_body() -> usize {
    64 * 1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            upload_dir: default_upload_dir(),
            merge_concurrency: default_merge_concurrency(),
            max_chunk_body: default_max_chunk_body(),
        }
    }
}

impl Config {
    /// Loads configuration from the default location.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    /// Loads configuration from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        if config.merge_concurrency == 0 {
            tracing::warn!("merge_concurrency must be at least 1, using 1");
            config.merge_concurrency = 1;
        }
        Ok(config)
    }
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("resumable.toml"))
}
