//! Errors surfaced by the hub's externally visible operations.

use thiserror::Error;

use super::StoreError;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type HubResult<T> = Result<T, HubError>;
