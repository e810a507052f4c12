//! Collaborator client configuration: job store, result cache, scrape executor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Job store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Remote GraphQL hub.
    Graphql,
    /// JSON files on local disk.
    File,
    /// In-process, lost on restart.
    #[default]
    Memory,
}

/// Job store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// GraphQL endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token sent to the GraphQL endpoint.
    #[serde(default)]
    pub token: Option<String>,

    /// Root directory of the file backend.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            endpoint: None,
            token: None,
            path: None,
            timeout_secs: default_store_timeout(),
        }
    }
}

fn default_store_timeout() -> u64 {
    30
}

impl StoreConfig {
    /// Resolve the file backend directory.
    pub fn data_dir(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".scrapehub")
                .join("store")
        })
    }
}

/// Result cache backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Upstash-compatible Redis REST API.
    Upstash,
    #[default]
    Memory,
}

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Expiry of cached results; unset means no expiry.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            url: None,
            token: None,
            key_prefix: default_key_prefix(),
            ttl_secs: None,
        }
    }
}

fn default_key_prefix() -> String {
    "scrapingJob:".to_string()
}

/// Scrape executor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Scraper service URL.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout. The scheduler imposes none of its own.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}
