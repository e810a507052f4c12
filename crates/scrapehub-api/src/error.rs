//! API error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scrapehub_core::{HubError, StoreError};
use thiserror::Error;

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Hub(#[from] HubError),

    /// The job exists but has never produced a successful result.
    #[error("No result yet for job: {0}")]
    NoResult(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Hub(HubError::Store(err))
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Hub(HubError::JobNotFound(_)) | Self::NoResult(_) => StatusCode::NOT_FOUND,
            Self::Hub(HubError::Store(StoreError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Hub(HubError::Store(StoreError::MalformedResponse(_))) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::from(HubError::JobNotFound("j1".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::NoResult("j1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::Unavailable("down".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(StoreError::MalformedResponse("bad".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_message() {
        let err = ApiError::from(HubError::JobNotFound("j9".into()));
        assert_eq!(err.to_string(), "Job not found: j9");
    }
}
