//! HTTP boundary exposing the submit/poll workflow.
//!
//! `POST /think` submits a query (`202 {"id": ...}`) or polls a job
//! (`{"reply": ...}`); `GET /healthz` reports liveness.

mod error;
mod think;

pub use error::{ApiError, INVALID_REQUEST_DETAIL, UNKNOWN_JOB_DETAIL};
pub use think::{NOT_READY_REPLY, ThinkRequest, think};

use crate::job::ports::{JobStore, ReplyGenerator};
use crate::job::services::ThinkService;
use axum::Json;
use axum::Router;
use axum::routing::{get, post};
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;

/// Builds the application router.
#[must_use]
pub fn router<J, G, C>(service: Arc<ThinkService<J, G, C>>) -> Router
where
    J: JobStore + 'static,
    G: ReplyGenerator + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/think", post(think::<J, G, C>))
        .route("/healthz", get(|| async { Json(json!({"status": "ok"})) }))
        .with_state(service)
}
