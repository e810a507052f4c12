//! File system based job store.
//!
//! Layout under the store root:
//!
//! ```text
//! jobs/<id>.json          one JobDefinition per file
//! history/<id>.jsonl      one ExecutionRecord per line, append-only
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use scrapehub_core::record::sort_newest_first;
use scrapehub_core::{ExecutionRecord, JobDefinition, JobStore, NewExecutionRecord, StoreError};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Job store backed by JSON files on local disk.
pub struct FileJobStore {
    storage_path: PathBuf,
    append_lock: Mutex<()>,
}

impl FileJobStore {
    /// Open (creating if needed) a file store rooted at `storage_path`.
    pub async fn new(storage_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let storage_path = storage_path.into();

        for dir in [storage_path.join("jobs"), storage_path.join("history")] {
            fs::create_dir_all(&dir).await.map_err(|e| {
                StoreError::Unavailable(format!("Failed to create {:?}: {}", dir, e))
            })?;
        }

        debug!("FileJobStore initialized at {:?}", storage_path);
        Ok(Self {
            storage_path,
            append_lock: Mutex::new(()),
        })
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    fn jobs_dir(&self) -> PathBuf {
        self.storage_path.join("jobs")
    }

    fn job_path(&self, id: &str) -> PathBuf {
        self.jobs_dir().join(format!("{}.json", Self::sanitize_id(id)))
    }

    fn history_path(&self, job_id: &str) -> PathBuf {
        self.storage_path
            .join("history")
            .join(format!("{}.jsonl", Self::sanitize_id(job_id)))
    }

    fn sanitize_id(id: &str) -> String {
        id.chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Write a job definition file.
    pub async fn save_job(&self, job: &JobDefinition) -> Result<(), StoreError> {
        let path = self.job_path(&job.id);
        let content = serde_json::to_string_pretty(job)
            .map_err(|e| StoreError::MalformedResponse(format!("Failed to serialize job: {}", e)))?;

        fs::write(&path, content)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to write job file: {}", e)))?;

        debug!("Saved job '{}' to {:?}", job.id, path);
        Ok(())
    }

    /// Delete a job definition file. History is kept.
    pub async fn delete_job(&self, id: &str) -> Result<(), StoreError> {
        let path = self.job_path(id);
        if path.exists() {
            fs::remove_file(&path)
                .await
                .map_err(|e| StoreError::Unavailable(format!("Failed to delete job file: {}", e)))?;
            debug!("Deleted job '{}' from {:?}", id, path);
        }
        Ok(())
    }

    async fn read_job(path: &Path) -> Result<JobDefinition, StoreError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to read {:?}: {}", path, e)))?;
        serde_json::from_str(&content)
            .map_err(|e| StoreError::MalformedResponse(format!("Invalid job file {:?}: {}", path, e)))
    }
}

#[async_trait]
impl JobStore for FileJobStore {
    async fn list_jobs(&self) -> Result<Vec<JobDefinition>, StoreError> {
        let jobs_dir = self.jobs_dir();
        if !jobs_dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&jobs_dir).await.map_err(|e| {
            StoreError::Unavailable(format!("Failed to read jobs directory: {}", e))
        })?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StoreError::Unavailable(format!("Failed to read directory entry: {}", e))
        })? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        // One bad file fails the whole listing.
        let mut jobs = Vec::with_capacity(paths.len());
        for path in &paths {
            jobs.push(Self::read_job(path).await?);
        }

        debug!("Loaded {} jobs from {:?}", jobs.len(), jobs_dir);
        Ok(jobs)
    }

    async fn get_job(&self, id: &str) -> Result<Option<JobDefinition>, StoreError> {
        let path = self.job_path(id);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_job(&path).await.map(Some)
    }

    async fn append_history(&self, record: NewExecutionRecord) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let path = self.history_path(&record.job_id);
        let entry = ExecutionRecord::new(id.clone(), record);
        let mut line = serde_json::to_string(&entry).map_err(|e| {
            StoreError::MalformedResponse(format!("Failed to serialize record: {}", e))
        })?;
        line.push('\n');

        let _guard = self.append_lock.lock().await;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to open {:?}: {}", path, e)))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to append history: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to flush history: {}", e)))?;

        Ok(id)
    }

    async fn list_history(&self, job_id: &str) -> Result<Vec<ExecutionRecord>, StoreError> {
        let path = self.history_path(job_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to read {:?}: {}", path, e)))?;

        let mut records = Vec::new();
        for (n, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ExecutionRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable history line {} in {:?}: {}", n + 1, path, e),
            }
        }

        sort_newest_first(&mut records);
        Ok(records)
    }
}

#[cfg(test)]
#[path = "file_store_tests.rs"]
mod tests;
