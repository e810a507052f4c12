//! Job store interface.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::job::JobDefinition;
use crate::record::{ExecutionRecord, NewExecutionRecord};

/// Authoritative source of job definitions and sink for execution history.
///
/// Implementations must be safe for concurrent use by many simultaneous
/// job firings.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Fetch every job definition.
    ///
    /// Either the whole list is returned or an error; never a partial list.
    async fn list_jobs(&self) -> Result<Vec<JobDefinition>, StoreError>;

    /// Fetch one job definition.
    async fn get_job(&self, id: &str) -> Result<Option<JobDefinition>, StoreError>;

    /// Append one history record, returning its store-assigned ID.
    async fn append_history(&self, record: NewExecutionRecord) -> Result<String, StoreError>;

    /// History for one job, newest first.
    async fn list_history(&self, job_id: &str) -> Result<Vec<ExecutionRecord>, StoreError>;
}
