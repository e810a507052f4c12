//! Job store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport failure, timeout or non-success HTTP status.
    #[error("Job store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but the payload could not be understood.
    #[error("Malformed job store response: {0}")]
    MalformedResponse(String),
}
