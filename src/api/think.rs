//! `/think` submit/poll endpoint.

use super::ApiError;
use crate::job::domain::JobId;
use crate::job::ports::{JobStore, ReplyGenerator};
use crate::job::services::{JobPoll, ThinkService};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Reply text while a job is still running.
pub const NOT_READY_REPLY: &str = "not ready";

/// Body of a `/think` request.
///
/// `user_query` submits a new job; `id` alone polls one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThinkRequest {
    /// Job to poll.
    #[serde(default)]
    pub id: Option<String>,
    /// Prior conversation, passed through to the generation engine.
    #[serde(default)]
    pub history: Option<Vec<Value>>,
    /// Query to submit.
    #[serde(default)]
    pub user_query: Option<String>,
}

#[derive(Debug, Serialize)]
struct SubmittedBody {
    id: String,
}

#[derive(Debug, Serialize)]
struct ReplyBody {
    reply: String,
}

/// Handles `POST /think`.
///
/// # Errors
///
/// Returns [`ApiError`] for unknown jobs, requests without `id` or
/// `user_query`, and store failures.
pub async fn think<J, G, C>(
    State(service): State<Arc<ThinkService<J, G, C>>>,
    Json(request): Json<ThinkRequest>,
) -> Result<Response, ApiError>
where
    J: JobStore + 'static,
    G: ReplyGenerator + 'static,
    C: Clock + Send + Sync + 'static,
{
    match request {
        ThinkRequest {
            user_query: Some(query),
            history,
            ..
        } => {
            info!(history = history.as_ref().map_or(0, Vec::len), "received submission");
            let submitted = service.submit(query, history.unwrap_or_default()).await?;
            let body = SubmittedBody {
                id: submitted.id().to_string(),
            };
            Ok((StatusCode::ACCEPTED, Json(body)).into_response())
        }
        ThinkRequest {
            id: Some(raw_id), ..
        } => {
            let Ok(id) = raw_id.parse::<JobId>() else {
                warn!(id = %raw_id, "poll with malformed job id");
                return Err(ApiError::unknown_job());
            };
            let reply = match service.poll(id).await? {
                JobPoll::NotReady => NOT_READY_REPLY.to_owned(),
                JobPoll::Ready(text) => text,
            };
            Ok(Json(ReplyBody { reply }).into_response())
        }
        _ => Err(ApiError::invalid_request()),
    }
}
