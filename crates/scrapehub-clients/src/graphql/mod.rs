//! GraphQL job store client.

mod documents;
mod wire;

use std::time::Duration;

use async_trait::async_trait;
use scrapehub_core::record::sort_newest_first;
use scrapehub_core::{ExecutionRecord, JobDefinition, JobStore, NewExecutionRecord, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use wire::{
    CreateHistoryData, CreateHistoryVariables, GetJobData, GraphqlRequest, GraphqlResponse,
    HistoryData, IdVariables, ListJobsData, NoVariables,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Job store backed by the scraping hub's GraphQL API.
pub struct GraphqlJobStore {
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl GraphqlJobStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<V, T>(&self, query: &str, variables: V) -> Result<T, StoreError>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&GraphqlRequest { query, variables });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Unavailable(format!("HTTP {}: {}", status, text)));
        }

        let body: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;

        if !body.errors.is_empty() {
            let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(StoreError::MalformedResponse(messages.join("; ")));
        }

        body.data
            .ok_or_else(|| StoreError::MalformedResponse("response has no data".to_string()))
    }
}

#[async_trait]
impl JobStore for GraphqlJobStore {
    async fn list_jobs(&self) -> Result<Vec<JobDefinition>, StoreError> {
        let data: ListJobsData = self.execute(documents::LIST_JOBS, NoVariables {}).await?;
        debug!("Fetched {} jobs from {}", data.scraping_jobs.len(), self.endpoint);
        Ok(data.scraping_jobs.into_iter().map(JobDefinition::from).collect())
    }

    async fn get_job(&self, id: &str) -> Result<Option<JobDefinition>, StoreError> {
        let data: GetJobData = self.execute(documents::GET_JOB, IdVariables { id }).await?;
        Ok(data.scraping_job.map(JobDefinition::from))
    }

    async fn append_history(&self, record: NewExecutionRecord) -> Result<String, StoreError> {
        let variables = CreateHistoryVariables {
            input: record.into(),
        };
        let data: CreateHistoryData = self.execute(documents::CREATE_HISTORY, variables).await?;
        data.created.map(|c| c.id).ok_or_else(|| {
            StoreError::MalformedResponse("createScrapingJobHistory returned null".to_string())
        })
    }

    async fn list_history(&self, job_id: &str) -> Result<Vec<ExecutionRecord>, StoreError> {
        let data: HistoryData = self
            .execute(documents::LIST_HISTORY, IdVariables { id: job_id })
            .await?;
        let Some(job) = data.scraping_job else {
            return Ok(Vec::new());
        };

        let mut records = Vec::with_capacity(job.histories.len());
        for node in job.histories {
            let node_id = node.id.clone();
            match ExecutionRecord::try_from(node) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping history record {} of job {}: {}", node_id, job_id, e),
            }
        }
        sort_newest_first(&mut records);
        Ok(records)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
