//! Hand-written collaborator fakes shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use scrapehub_core::record::sort_newest_first;
use scrapehub_core::{
    CacheError, ExecutionRecord, ExecutorError, JobDefinition, JobStore, NewExecutionRecord,
    ResultCache, ScrapeExecutor, ScrapeTarget, StoreError,
};
use serde_json::Value;
use tokio::sync::Semaphore;

pub fn job(id: &str, schedule: &str) -> JobDefinition {
    JobDefinition::new(
        id,
        schedule,
        ScrapeTarget::new(format!("https://example.com/{}", id), "h1", "page title"),
    )
}

#[derive(Default)]
pub struct FakeStore {
    pub jobs: Mutex<Vec<JobDefinition>>,
    pub history: Mutex<Vec<ExecutionRecord>>,
    pub fail_list: AtomicBool,
    pub fail_append: AtomicBool,
    pub list_calls: AtomicUsize,
}

impl FakeStore {
    pub fn with_jobs(jobs: Vec<JobDefinition>) -> Arc<Self> {
        let store = Self::default();
        *store.jobs.lock() = jobs;
        Arc::new(store)
    }

    pub fn set_jobs(&self, jobs: Vec<JobDefinition>) {
        *self.jobs.lock() = jobs;
    }

    pub fn records_for(&self, job_id: &str) -> Vec<ExecutionRecord> {
        self.history
            .lock()
            .iter()
            .filter(|r| r.job_id() == job_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl JobStore for FakeStore {
    async fn list_jobs(&self) -> Result<Vec<JobDefinition>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(self.jobs.lock().clone())
    }

    async fn get_job(&self, id: &str) -> Result<Option<JobDefinition>, StoreError> {
        Ok(self.jobs.lock().iter().find(|j| j.id == id).cloned())
    }

    async fn append_history(&self, record: NewExecutionRecord) -> Result<String, StoreError> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write timed out".to_string()));
        }
        let mut history = self.history.lock();
        let id = format!("rec-{}", history.len() + 1);
        history.push(ExecutionRecord::new(id.clone(), record));
        Ok(id)
    }

    async fn list_history(&self, job_id: &str) -> Result<Vec<ExecutionRecord>, StoreError> {
        let mut records = self.records_for(job_id);
        sort_newest_first(&mut records);
        Ok(records)
    }
}

#[derive(Default)]
pub struct FakeCache {
    pub entries: Mutex<HashMap<String, Value>>,
    pub fail: AtomicBool,
    pub sets: AtomicUsize,
}

impl FakeCache {
    pub fn value(&self, key: &str) -> Option<Value> {
        self.entries.lock().get(key).cloned()
    }
}

#[async_trait]
impl ResultCache for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("cache offline".to_string()));
        }
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value, _ttl: Option<Duration>) -> Result<(), CacheError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("cache offline".to_string()));
        }
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Executor returning scripted outcomes in order, then a default.
pub struct ScriptedExecutor {
    outcomes: Mutex<VecDeque<Result<Value, ExecutorError>>>,
    pub calls: AtomicUsize,
    pub targets: Mutex<Vec<ScrapeTarget>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedExecutor {
    pub fn new(outcomes: Vec<Result<Value, ExecutorError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
            targets: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn ok(value: Value) -> Self {
        Self::new(vec![Ok(value)])
    }

    /// Block every call until a permit is added to `gate`.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        let mut executor = Self::new(Vec::new());
        executor.gate = Some(gate);
        executor
    }
}

#[async_trait]
impl ScrapeExecutor for ScriptedExecutor {
    async fn execute(&self, target: &ScrapeTarget) -> Result<Value, ExecutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().push(target.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(serde_json::json!({"ok": true})))
    }
}
