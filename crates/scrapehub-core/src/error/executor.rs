//! Scrape executor errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The executor (or the page behind it) could not be reached.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// The page was fetched but no structured data could be produced.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Upstream payload too large: {0}")]
    UpstreamTooLarge(String),

    #[error("Executor error: {status} - {message}")]
    Upstream { status: u16, message: String },
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
