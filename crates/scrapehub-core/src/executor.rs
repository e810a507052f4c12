//! Scrape executor interface.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ExecutorError;
use crate::job::ScrapeTarget;

/// Fetches a page, extracts the selected text and structures it.
///
/// Treated as a pure function of its input: the same target may be
/// executed concurrently from overlapping firings.
#[async_trait]
pub trait ScrapeExecutor: Send + Sync {
    async fn execute(&self, target: &ScrapeTarget) -> Result<Value, ExecutorError>;
}
