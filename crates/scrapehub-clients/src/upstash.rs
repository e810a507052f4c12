//! Result cache over an Upstash-compatible Redis REST API.
//!
//! Each call POSTs one Redis command as a JSON array to the base URL and
//! reads `{"result": ...}` or `{"error": "..."}` back. Values are stored
//! as JSON text.

use std::time::Duration;

use async_trait::async_trait;
use scrapehub_core::{CacheError, ResultCache};
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Redis REST cache client.
pub struct UpstashCache {
    url: String,
    token: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl UpstashCache {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn command(&self, args: Value) -> Result<Value, CacheError> {
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body: CommandResponse = response
            .json()
            .await
            .map_err(|e| CacheError::Unavailable(format!("HTTP {}: {}", status.as_u16(), e)))?;

        if let Some(error) = body.error {
            return Err(CacheError::Unavailable(error));
        }
        if !status.is_success() {
            return Err(CacheError::Unavailable(format!("HTTP {}", status.as_u16())));
        }
        Ok(body.result)
    }
}

#[async_trait]
impl ResultCache for UpstashCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        match self.command(json!(["GET", key])).await? {
            Value::Null => Ok(None),
            Value::String(text) => Ok(Some(serde_json::from_str(&text)?)),
            other => Err(CacheError::Serialization(format!(
                "unexpected GET result: {}",
                other
            ))),
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError> {
        let encoded = serde_json::to_string(value)?;
        let args = match ttl {
            Some(ttl) => json!(["SET", key, encoded, "EX", ttl.as_secs().max(1)]),
            None => json!(["SET", key, encoded]),
        };
        self.command(args).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "upstash_tests.rs"]
mod tests;
