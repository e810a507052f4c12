//! In-memory job store.

use std::collections::HashMap;

use async_trait::async_trait;
use scrapehub_core::record::sort_newest_first;
use scrapehub_core::{ExecutionRecord, JobDefinition, JobStore, NewExecutionRecord, StoreError};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Job store kept entirely in process memory.
///
/// Jobs are listed in insertion order.
pub struct MemoryJobStore {
    jobs: RwLock<Vec<JobDefinition>>,
    history: RwLock<HashMap<String, Vec<ExecutionRecord>>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(Vec::new()),
            history: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store pre-populated with `jobs`.
    pub fn with_jobs(jobs: Vec<JobDefinition>) -> Self {
        Self {
            jobs: RwLock::new(jobs),
            history: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a job definition.
    pub async fn save_job(&self, job: JobDefinition) {
        let mut jobs = self.jobs.write().await;
        match jobs.iter_mut().find(|j| j.id == job.id) {
            Some(existing) => *existing = job,
            None => jobs.push(job),
        }
    }

    /// Remove a job definition. History is kept.
    pub async fn delete_job(&self, id: &str) -> bool {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|j| j.id != id);
        jobs.len() != before
    }
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn list_jobs(&self) -> Result<Vec<JobDefinition>, StoreError> {
        Ok(self.jobs.read().await.clone())
    }

    async fn get_job(&self, id: &str) -> Result<Option<JobDefinition>, StoreError> {
        Ok(self.jobs.read().await.iter().find(|j| j.id == id).cloned())
    }

    async fn append_history(&self, record: NewExecutionRecord) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut history = self.history.write().await;
        history
            .entry(record.job_id.clone())
            .or_default()
            .push(ExecutionRecord::new(id.clone(), record));
        Ok(id)
    }

    async fn list_history(&self, job_id: &str) -> Result<Vec<ExecutionRecord>, StoreError> {
        let mut records = self
            .history
            .read()
            .await
            .get(job_id)
            .cloned()
            .unwrap_or_default();
        sort_newest_first(&mut records);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use scrapehub_core::ScrapeTarget;
    use serde_json::json;

    fn job(id: &str) -> JobDefinition {
        JobDefinition::new(id, "0 * * * *", ScrapeTarget::new("https://a.example", "p", ""))
    }

    fn record(job_id: &str, offset_secs: i64, successful: bool) -> NewExecutionRecord {
        let started_at = Utc::now() + Duration::seconds(offset_secs);
        NewExecutionRecord {
            job_id: job_id.to_string(),
            started_at,
            ended_at: started_at,
            successful,
            content: json!({"offset": offset_secs}),
        }
    }

    #[tokio::test]
    async fn test_memory_job_store_jobs() {
        let store = MemoryJobStore::new();
        store.save_job(job("a")).await;
        store.save_job(job("b")).await;

        let mut updated = job("a");
        updated.schedule = "*/5 * * * *".to_string();
        store.save_job(updated).await;

        let jobs = store.list_jobs().await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, "a");
        assert_eq!(jobs[0].schedule, "*/5 * * * *");

        assert!(store.get_job("b").await.unwrap().is_some());
        assert!(store.delete_job("b").await);
        assert!(!store.delete_job("b").await);
        assert!(store.get_job("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_job_store_history_newest_first() {
        let store = MemoryJobStore::with_jobs(vec![job("a")]);
        let first = store.append_history(record("a", -10, true)).await.unwrap();
        let second = store.append_history(record("a", 0, false)).await.unwrap();
        let older = store.append_history(record("a", -20, true)).await.unwrap();
        store.append_history(record("other", 0, true)).await.unwrap();

        let history = store.list_history("a").await.unwrap();
        let ids: Vec<_> = history.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![second, first, older]);
        assert!(store.list_history("missing").await.unwrap().is_empty());
    }
}
