//! ScrapeHub facade.
//!
//! Wires the scheduler core together and exposes the operations used by
//! the HTTP API and the CLI.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono_tz::Tz;
use scrapehub_core::{
    ExecutionRecord, HubError, HubResult, JobStore, ResultCache, ScrapeExecutor, StoreError,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::reconcile::{ReconcileStatus, Reconciler, ReconciliationLoop};
use crate::runner::{CachePolicy, ExecutionRunner, RunOutcome};
use crate::scheduler::{ActiveTrigger, ReconcileReport, TriggerScheduler};

/// Hub-wide settings.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub timezone: Tz,
    pub cache: CachePolicy,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            cache: CachePolicy::default(),
        }
    }
}

/// Where a latest result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Cache,
    History,
}

/// The most recent successful result of a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestResult {
    pub job_id: String,
    pub source: ResultSource,
    pub content: Value,
}

/// Snapshot of scheduler health.
#[derive(Debug, Clone, Serialize)]
pub struct HubStatus {
    pub uptime_secs: u64,
    pub timezone: String,
    pub generation: u64,
    pub active_triggers: usize,
    pub reconcile: ReconcileStatus,
}

/// The scheduling core with its collaborators.
pub struct ScrapeHub {
    store: Arc<dyn JobStore>,
    cache: Arc<dyn ResultCache>,
    runner: Arc<ExecutionRunner>,
    scheduler: Arc<TriggerScheduler>,
    reconciler: Arc<Reconciler>,
    started: Instant,
}

impl ScrapeHub {
    pub fn new(
        config: HubConfig,
        store: Arc<dyn JobStore>,
        cache: Arc<dyn ResultCache>,
        executor: Arc<dyn ScrapeExecutor>,
    ) -> Self {
        let runner = Arc::new(
            ExecutionRunner::new(Arc::clone(&store), Arc::clone(&cache), executor)
                .with_cache_policy(config.cache),
        );
        let scheduler = Arc::new(TriggerScheduler::with_runner(
            config.timezone,
            Arc::clone(&runner),
        ));
        let reconciler = Arc::new(Reconciler::new(Arc::clone(&store), Arc::clone(&scheduler)));

        Self {
            store,
            cache,
            runner,
            scheduler,
            reconciler,
            started: Instant::now(),
        }
    }

    pub fn scheduler(&self) -> &Arc<TriggerScheduler> {
        &self.scheduler
    }

    pub fn reconciler(&self) -> &Arc<Reconciler> {
        &self.reconciler
    }

    /// Build the periodic reconciliation driver for this hub.
    pub fn reconciliation_loop(&self, poll_interval: Option<Duration>) -> ReconciliationLoop {
        ReconciliationLoop::new(Arc::clone(&self.reconciler), poll_interval)
    }

    /// Re-fetch jobs and reinstall triggers immediately.
    pub async fn trigger_reconciliation(&self) -> Result<ReconcileReport, StoreError> {
        info!("Reconciliation requested");
        self.reconciler.reconcile_now().await
    }

    /// Run one job outside its schedule, with parameters read now.
    pub async fn run_job_now(&self, job_id: &str) -> HubResult<RunOutcome> {
        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or_else(|| HubError::JobNotFound(job_id.to_string()))?;

        info!("Manual run of job {}", job_id);
        Ok(self.runner.run(&job.id, &job.target).await)
    }

    pub fn list_active_triggers(&self) -> Vec<ActiveTrigger> {
        self.scheduler.active_triggers()
    }

    /// Latest successful result: cache first, history as fallback.
    ///
    /// A history hit is written back to the cache best-effort, unless a
    /// run cached a newer result while history was being read.
    pub async fn latest_result(&self, job_id: &str) -> HubResult<Option<LatestResult>> {
        let key = self.runner.cache_policy().key_for(job_id);
        match self.cache.get(&key).await {
            Ok(Some(content)) => {
                return Ok(Some(LatestResult {
                    job_id: job_id.to_string(),
                    source: ResultSource::Cache,
                    content,
                }));
            }
            Ok(None) => debug!("Cache miss for job {}", job_id),
            Err(e) => warn!("Cache read failed for job {}, using history: {}", job_id, e),
        }

        let history = self.job_history(job_id).await?;
        let Some(latest) = history.into_iter().find(|r| r.is_successful()) else {
            return Ok(None);
        };

        let content = latest.record.content;
        match self.runner.refill_cache(job_id, &content).await {
            Ok(Some(newer)) => {
                return Ok(Some(LatestResult {
                    job_id: job_id.to_string(),
                    source: ResultSource::Cache,
                    content: newer,
                }));
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to repopulate cache for job {}: {}", job_id, e),
        }

        Ok(Some(LatestResult {
            job_id: job_id.to_string(),
            source: ResultSource::History,
            content,
        }))
    }

    /// Execution history of a job, newest first.
    pub async fn job_history(&self, job_id: &str) -> HubResult<Vec<ExecutionRecord>> {
        if self.store.get_job(job_id).await?.is_none() {
            return Err(HubError::JobNotFound(job_id.to_string()));
        }
        Ok(self.store.list_history(job_id).await?)
    }

    pub fn status(&self) -> HubStatus {
        let generation = self.scheduler.snapshot();
        HubStatus {
            uptime_secs: self.started.elapsed().as_secs(),
            timezone: self.scheduler.timezone().name().to_string(),
            generation: generation.number(),
            active_triggers: if generation.is_cancelled() {
                0
            } else {
                generation.len()
            },
            reconcile: self.reconciler.status(),
        }
    }

    /// Stop all future fires. In-flight runs are left to finish.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
