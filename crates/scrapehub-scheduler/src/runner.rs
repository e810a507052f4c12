//! Execution Runner.
//!
//! Runs one job firing end to end: execute, append history, write through
//! to the cache. Every failure is contained here; nothing propagates back
//! to the trigger that dispatched the run.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use scrapehub_core::{
    cache_key, CacheError, JobStore, NewExecutionRecord, ResultCache, ScrapeExecutor,
    ScrapeTarget, DEFAULT_KEY_PREFIX,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Outcome of one run, for callers that want to inspect it.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// ID the store assigned, `None` when the history write failed.
    pub record_id: Option<String>,
    pub record: NewExecutionRecord,
    /// Whether the cache now holds this run's content.
    pub cached: bool,
}

impl RunOutcome {
    pub fn is_successful(&self) -> bool {
        self.record.successful
    }
}

/// Cache write settings used by the runner.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub key_prefix: String,
    pub ttl: Option<Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            ttl: None,
        }
    }
}

impl CachePolicy {
    pub fn key_for(&self, job_id: &str) -> String {
        cache_key(&self.key_prefix, job_id)
    }
}

/// Executes job firings against the three collaborators.
pub struct ExecutionRunner {
    store: Arc<dyn JobStore>,
    cache: Arc<dyn ResultCache>,
    executor: Arc<dyn ScrapeExecutor>,
    cache_policy: CachePolicy,
    /// Orders run write-through against history refills.
    cache_writes: Mutex<()>,
}

impl ExecutionRunner {
    pub fn new(
        store: Arc<dyn JobStore>,
        cache: Arc<dyn ResultCache>,
        executor: Arc<dyn ScrapeExecutor>,
    ) -> Self {
        Self {
            store,
            cache,
            executor,
            cache_policy: CachePolicy::default(),
            cache_writes: Mutex::new(()),
        }
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn cache_policy(&self) -> &CachePolicy {
        &self.cache_policy
    }

    /// Run one firing of `job_id` with the given parameters.
    ///
    /// Never fails. Executor errors become an unsuccessful record; history
    /// and cache write failures are logged.
    pub async fn run(&self, job_id: &str, target: &ScrapeTarget) -> RunOutcome {
        let started_at = Utc::now();
        debug!("Running job {} against {}", job_id, target.href);

        let (successful, content) = match self.executor.execute(target).await {
            Ok(result) => (true, result),
            Err(e) => {
                warn!("Job {} failed: {}", job_id, e);
                (false, NewExecutionRecord::error_content(e.to_string()))
            }
        };

        let record = NewExecutionRecord {
            job_id: job_id.to_string(),
            started_at,
            ended_at: Utc::now(),
            successful,
            content,
        };

        let record_id = match self.store.append_history(record.clone()).await {
            Ok(id) => {
                info!(
                    "Job {} finished (successful: {}, record {})",
                    job_id, successful, id
                );
                Some(id)
            }
            Err(e) => {
                error!(
                    "Failed to record run of job {} started at {}, record lost: {}",
                    job_id,
                    started_at.to_rfc3339(),
                    e
                );
                None
            }
        };

        let cached = successful && self.write_cache(job_id, &record).await;

        RunOutcome {
            record_id,
            record,
            cached,
        }
    }

    /// Put a result read from history back into the cache, unless an
    /// entry appeared since the caller's cache miss.
    ///
    /// Returns the entry found instead, if any. A run finishing while
    /// history was being read has already written a newer result, which
    /// must not be overwritten.
    pub async fn refill_cache(
        &self,
        job_id: &str,
        content: &Value,
    ) -> Result<Option<Value>, CacheError> {
        let key = self.cache_policy.key_for(job_id);
        let _writes = self.cache_writes.lock().await;

        if let Some(current) = self.cache.get(&key).await? {
            debug!("Cache for job {} filled meanwhile, keeping it", job_id);
            return Ok(Some(current));
        }
        self.cache.set(&key, content, self.cache_policy.ttl).await?;
        Ok(None)
    }

    async fn write_cache(&self, job_id: &str, record: &NewExecutionRecord) -> bool {
        let key = self.cache_policy.key_for(job_id);
        let _writes = self.cache_writes.lock().await;
        match self
            .cache
            .set(&key, &record.content, self.cache_policy.ttl)
            .await
        {
            Ok(()) => {
                debug!("Cached latest result of job {} under {}", job_id, key);
                true
            }
            Err(e) => {
                warn!("Failed to cache result of job {}: {}", job_id, e);
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
