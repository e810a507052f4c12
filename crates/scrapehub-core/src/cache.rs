//! Result cache interface.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CacheError;

/// Key prefix used for cached job results.
pub const DEFAULT_KEY_PREFIX: &str = "scrapingJob:";

/// Build the cache key for a job's latest result.
pub fn cache_key(prefix: &str, job_id: &str) -> String {
    format!("{}{}", prefix, job_id)
}

/// Key-value cache holding the latest successful result per job.
///
/// Not authoritative: entries may be absent, stale or evicted at any time.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Read a value. A missing or expired key is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Write a value, optionally expiring after `ttl`.
    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError>;
}
