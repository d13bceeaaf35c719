//! JSON-RPC 2.0 message types and response-body decoding.
//!
//! Streamable-HTTP servers answer a POST either with a plain JSON body or
//! with a `text/event-stream` body whose `data:` payloads carry JSON-RPC
//! messages. [`decode_response`] accepts both.

use crate::tool_session::ports::ToolSessionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version string carried by every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC request or notification.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Correlation identifier. Absent for notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    /// Builds a request expecting a response.
    #[must_use]
    pub fn call(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: Some(id),
            method: method.into(),
            params: Some(params),
        }
    }

    /// Builds a notification.
    #[must_use]
    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: None,
            method: method.into(),
            params: None,
        }
    }
}

/// JSON-RPC response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    /// Matching request identifier.
    #[serde(default)]
    pub id: Option<Value>,
    /// Successful result.
    #[serde(default)]
    pub result: Option<Value>,
    /// Error object.
    #[serde(default)]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Returns the result or converts the error object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolSessionError::Protocol`] for error responses and
    /// [`ToolSessionError::UnexpectedResponse`] when neither field is set.
    pub fn into_result(self) -> Result<Value, ToolSessionError> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(ToolSessionError::Protocol {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(ToolSessionError::UnexpectedResponse(
                "response carries neither result nor error".to_owned(),
            )),
        }
    }

    fn answers(&self, id: u64) -> bool {
        self.id.as_ref().and_then(Value::as_u64) == Some(id)
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    /// Error code.
    pub code: i64,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Extracts the response to request `id` from a response body.
///
/// # Errors
///
/// Returns [`ToolSessionError::UnexpectedResponse`] when no payload in the
/// body is a response to `id`.
pub fn decode_response(body: &str, id: u64) -> Result<RpcResponse, ToolSessionError> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        let response: RpcResponse = serde_json::from_str(trimmed)
            .map_err(|err| ToolSessionError::UnexpectedResponse(err.to_string()))?;
        return Ok(response);
    }

    event_payloads(body)
        .filter_map(|payload| serde_json::from_str::<RpcResponse>(&payload).ok())
        .find(|response| response.answers(id))
        .ok_or_else(|| {
            ToolSessionError::UnexpectedResponse(format!("no response to request {id} in body"))
        })
}

/// Splits an event-stream body into its `data:` payloads.
fn event_payloads(body: &str) -> impl Iterator<Item = String> + '_ {
    let mut events = Vec::new();
    let mut current = String::new();
    for line in body.lines() {
        if line.is_empty() {
            if !current.is_empty() {
                events.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(data) = line.strip_prefix("data:") {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(data.strip_prefix(' ').unwrap_or(data));
        }
    }
    if !current.is_empty() {
        events.push(current);
    }
    events.into_iter()
}
