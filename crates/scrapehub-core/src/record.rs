//! Execution history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one firing, before the store has assigned it an ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExecutionRecord {
    #[serde(rename = "scraping_job_id", alias = "job_id")]
    pub job_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub successful: bool,
    /// Structured result, or `{"error": "..."}` when unsuccessful.
    pub content: Value,
}

impl NewExecutionRecord {
    /// Build the error payload stored for a failed run.
    pub fn error_content(message: impl Into<String>) -> Value {
        serde_json::json!({ "error": message.into() })
    }
}

/// Immutable, append-only history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Store-assigned record ID.
    pub id: String,
    #[serde(flatten)]
    pub record: NewExecutionRecord,
}

impl ExecutionRecord {
    pub fn new(id: impl Into<String>, record: NewExecutionRecord) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.record.job_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.record.started_at
    }

    pub fn is_successful(&self) -> bool {
        self.record.successful
    }

    pub fn content(&self) -> &Value {
        &self.record.content
    }
}

/// Sort records newest first.
///
/// Overlapping runs of one job are legal, so history is ordered by
/// `started_at` rather than by insertion sequence.
pub fn sort_newest_first(records: &mut [ExecutionRecord]) {
    records.sort_by(|a, b| b.record.started_at.cmp(&a.record.started_at));
}
