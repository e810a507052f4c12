//! Scrape executor over HTTP.
//!
//! POSTs `{href, selector, description}` to the scraper service and maps
//! its status codes onto [`ExecutorError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use scrapehub_core::{ExecutorError, ScrapeExecutor, ScrapeTarget};
use serde_json::Value;
use tracing::debug;

/// Client for the remote scraper service.
pub struct HttpScrapeExecutor {
    url: String,
    token: Option<String>,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl HttpScrapeExecutor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            timeout: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Bound each request. Without this a hung scraper stalls only the
    /// run waiting on it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl ScrapeExecutor for HttpScrapeExecutor {
    async fn execute(&self, target: &ScrapeTarget) -> Result<Value, ExecutorError> {
        let mut request = self.client.post(&self.url).json(target);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExecutorError::Fetch(e.to_string()))?;

        let status = response.status();
        debug!("Scraper answered {} for {}", status, target.href);

        match status {
            StatusCode::OK => response
                .json::<Value>()
                .await
                .map_err(|e| ExecutorError::Extraction(format!("Invalid scraper response: {}", e))),
            StatusCode::PAYLOAD_TOO_LARGE => {
                let text = response.text().await.unwrap_or_default();
                Err(ExecutorError::UpstreamTooLarge(text))
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let text = response.text().await.unwrap_or_default();
                Err(ExecutorError::Extraction(text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ExecutorError::Upstream {
                    status: status.as_u16(),
                    message: text,
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "http_executor_tests.rs"]
mod tests;
