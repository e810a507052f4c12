//! GraphQL request and response shapes.

use chrono::{DateTime, Utc};
use scrapehub_core::{ExecutionRecord, JobDefinition, NewExecutionRecord, ScrapeTarget, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlErrorEntry {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct IdVariables<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct NoVariables {}

#[derive(Debug, Serialize)]
pub struct CreateHistoryVariables {
    pub input: HistoryInput,
}

#[derive(Debug, Serialize)]
pub struct HistoryInput {
    pub scraping_job_id: String,
    pub started_at: String,
    pub ended_at: String,
    pub successful: bool,
    pub content: Value,
}

impl From<NewExecutionRecord> for HistoryInput {
    fn from(record: NewExecutionRecord) -> Self {
        Self {
            scraping_job_id: record.job_id,
            started_at: record.started_at.to_rfc3339(),
            ended_at: record.ended_at.to_rfc3339(),
            successful: record.successful,
            content: record.content,
        }
    }
}

/// Job as returned by the hub. Nullable columns are tolerated here; a
/// job with no schedule is later skipped by the scheduler.
#[derive(Debug, Deserialize)]
pub struct JobNode {
    pub id: String,
    pub cron_schedule: Option<String>,
    pub href: Option<String>,
    pub selector: Option<String>,
    pub description: Option<String>,
}

impl From<JobNode> for JobDefinition {
    fn from(node: JobNode) -> Self {
        JobDefinition::new(
            node.id,
            node.cron_schedule.unwrap_or_default(),
            ScrapeTarget::new(
                node.href.unwrap_or_default(),
                node.selector.unwrap_or_default(),
                node.description.unwrap_or_default(),
            ),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct ListJobsData {
    #[serde(rename = "scrapingJobs")]
    pub scraping_jobs: Vec<JobNode>,
}

#[derive(Debug, Deserialize)]
pub struct GetJobData {
    #[serde(rename = "scrapingJob")]
    pub scraping_job: Option<JobNode>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryData {
    #[serde(rename = "scrapingJob")]
    pub scraping_job: Option<HistoryJob>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryJob {
    #[serde(default)]
    pub histories: Vec<HistoryNode>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryNode {
    pub id: String,
    pub scraping_job_id: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    pub successful: Option<bool>,
    #[serde(default)]
    pub content: Value,
}

impl TryFrom<HistoryNode> for ExecutionRecord {
    type Error = StoreError;

    fn try_from(node: HistoryNode) -> Result<Self, Self::Error> {
        Ok(ExecutionRecord::new(
            node.id,
            NewExecutionRecord {
                job_id: node.scraping_job_id,
                started_at: parse_timestamp(node.started_at.as_deref())?,
                ended_at: parse_timestamp(node.ended_at.as_deref())?,
                successful: node.successful.unwrap_or(false),
                content: decode_content(node.content),
            },
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateHistoryData {
    #[serde(rename = "createScrapingJobHistory")]
    pub created: Option<CreatedHistory>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedHistory {
    pub id: String,
}

fn parse_timestamp(value: Option<&str>) -> Result<DateTime<Utc>, StoreError> {
    let value = value
        .ok_or_else(|| StoreError::MalformedResponse("Missing timestamp".to_string()))?;
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::MalformedResponse(format!("Invalid timestamp '{}': {}", value, e)))
}

/// Content columns may hold JSON text rather than a JSON value.
fn decode_content(content: Value) -> Value {
    match content {
        Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        other => other,
    }
}
