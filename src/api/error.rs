//! Error responses of the HTTP boundary.

use crate::job::services::ThinkServiceError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Message returned for unknown or already delivered jobs.
pub const UNKNOWN_JOB_DETAIL: &str = "Invalid or expired ID";

/// Message returned when a request neither submits nor polls.
pub const INVALID_REQUEST_DETAIL: &str =
    "Invalid request. Provide either 'user_query' to submit a new query or 'id' to poll.";

/// Error response serialised as `{"detail": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize)]
struct ApiErrorBody {
    detail: String,
}

impl ApiError {
    /// Creates an error with `status` and `detail`.
    #[must_use]
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                detail: detail.into(),
            },
        }
    }

    /// `404` for an unknown job.
    #[must_use]
    pub fn unknown_job() -> Self {
        Self::new(StatusCode::NOT_FOUND, UNKNOWN_JOB_DETAIL)
    }

    /// `400` for a request that neither submits nor polls.
    #[must_use]
    pub fn invalid_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, INVALID_REQUEST_DETAIL)
    }

    /// `500` with `detail`.
    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    /// Returns the response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ThinkServiceError> for ApiError {
    fn from(err: ThinkServiceError) -> Self {
        match err {
            ThinkServiceError::JobNotFound(_) => Self::unknown_job(),
            ThinkServiceError::Store(store_error) => Self::internal(store_error.to_string()),
        }
    }
}
