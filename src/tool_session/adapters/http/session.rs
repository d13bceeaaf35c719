//! Streamable-HTTP connector and session.

use super::probe::HttpHealthProbe;
use super::rpc::{RpcRequest, decode_response};
use crate::tool_session::{
    domain::{HealthSnapshot, ToolDescriptor, ToolInputSchema, ToolServerDescriptor, ToolServerName},
    ports::{
        Releasable, ResourceReleaseError, ResourceScope, ToolCallOutput, ToolServerConnectError,
        ToolServerConnectResult, ToolServerConnector, ToolSession, ToolSessionError,
        ToolSessionResult,
    },
};
use async_trait::async_trait;
use mockable::Clock;
use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Client, StatusCode, Url};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the server-assigned session identifier.
pub const SESSION_ID_HEADER: &str = "mcp-session-id";

/// Protocol revision announced during the handshake.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

const CLIENT_NAME: &str = "thinkwell";
const ACCEPTED_BODIES: &str = "application/json, text/event-stream";

/// Connector speaking the streamable-HTTP tool-provider protocol.
#[derive(Debug, Clone)]
pub struct StreamableHttpConnector<C> {
    client: Client,
    probe: HttpHealthProbe<C>,
    request_timeout: Duration,
}

impl<C> StreamableHttpConnector<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a connector.
    ///
    /// `probe_timeout` bounds each health request and `request_timeout`
    /// bounds every protocol request.
    #[must_use]
    pub fn new(
        client: Client,
        clock: Arc<C>,
        probe_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            probe: HttpHealthProbe::new(client.clone(), probe_timeout, clock),
            client,
            request_timeout,
        }
    }
}

#[async_trait]
impl<C> ToolServerConnector for StreamableHttpConnector<C>
where
    C: Clock + Send + Sync,
{
    async fn probe(&self, server: &ToolServerDescriptor) -> HealthSnapshot {
        self.probe.check(server).await
    }

    async fn open(
        &self,
        server: &ToolServerDescriptor,
        scope: &mut ResourceScope,
    ) -> ToolServerConnectResult<Arc<dyn ToolSession>> {
        let channel = Arc::new(HttpChannel {
            client: self.client.clone(),
            endpoint: server.address().clone(),
            server: server.name().clone(),
            timeout: self.request_timeout,
            session_id: RwLock::new(None),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        });
        scope.acquire(Arc::new(SessionTerminator {
            channel: Arc::clone(&channel),
        }));

        channel
            .handshake()
            .await
            .map_err(|err| ToolServerConnectError::Handshake {
                server: server.name().clone(),
                reason: err.to_string(),
            })?;

        Ok(Arc::new(StreamableHttpSession { channel }))
    }
}

#[derive(Debug)]
struct HttpChannel {
    client: Client,
    endpoint: Url,
    server: ToolServerName,
    timeout: Duration,
    session_id: RwLock<Option<String>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl HttpChannel {
    fn session_id(&self) -> Option<String> {
        self.session_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember_session(&self, headers: &HeaderMap) {
        let assigned = headers
            .get(SESSION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        if let Some(id) = assigned {
            *self
                .session_id
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Some(id);
        }
    }

    fn ensure_open(&self) -> ToolSessionResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ToolSessionError::Closed(self.server.clone()));
        }
        Ok(())
    }

    async fn post(&self, message: &RpcRequest) -> ToolSessionResult<reqwest::Response> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .header(ACCEPT, ACCEPTED_BODIES)
            .json(message);
        if let Some(id) = self.session_id() {
            request = request.header(SESSION_ID_HEADER, id);
        }
        request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(ToolSessionError::transport)
    }

    async fn request(&self, method: &str, params: Value) -> ToolSessionResult<Value> {
        self.ensure_open()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let response = self.post(&RpcRequest::call(id, method, params)).await?;
        self.remember_session(response.headers());
        let body = response.text().await.map_err(ToolSessionError::transport)?;
        decode_response(&body, id)?.into_result()
    }

    async fn notify(&self, method: &str) -> ToolSessionResult<()> {
        self.post(&RpcRequest::notification(method)).await?;
        Ok(())
    }

    async fn handshake(&self) -> ToolSessionResult<()> {
        let result = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {"name": CLIENT_NAME, "version": env!("CARGO_PKG_VERSION")},
                }),
            )
            .await?;
        let protocol = result
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or_default();
        debug!(server = %self.server, protocol, "tool server handshake accepted");
        self.notify("notifications/initialized").await
    }

    async fn terminate(&self) -> Result<(), reqwest::Error> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let Some(id) = self.session_id() else {
            return Ok(());
        };
        let response = self
            .client
            .delete(self.endpoint.clone())
            .timeout(self.timeout)
            .header(SESSION_ID_HEADER, id)
            .send()
            .await?;
        if response.status() == StatusCode::METHOD_NOT_ALLOWED {
            return Ok(());
        }
        response.error_for_status().map(|_| ())
    }
}

/// Ends the server-side session when released.
struct SessionTerminator {
    channel: Arc<HttpChannel>,
}

#[async_trait]
impl Releasable for SessionTerminator {
    fn label(&self) -> String {
        format!("session with {}", self.channel.server)
    }

    async fn release(&self) -> Result<(), ResourceReleaseError> {
        self.channel
            .terminate()
            .await
            .map_err(|err| ResourceReleaseError::new(self.label(), err))
    }
}

/// Live session with a streamable-HTTP tool server.
#[derive(Debug)]
pub struct StreamableHttpSession {
    channel: Arc<HttpChannel>,
}

#[async_trait]
impl ToolSession for StreamableHttpSession {
    async fn list_tools(&self) -> ToolSessionResult<Vec<ToolDescriptor>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let params = match &cursor {
                Some(page_cursor) => json!({"cursor": page_cursor}),
                None => json!({}),
            };
            let page = self.channel.request("tools/list", params).await?;
            let listed = page
                .get("tools")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    ToolSessionError::UnexpectedResponse("tools/list result has no tools".to_owned())
                })?;
            tools.extend(listed.iter().filter_map(|tool| self.parse_tool(tool)));

            cursor = page
                .get("nextCursor")
                .and_then(Value::as_str)
                .filter(|next| !next.is_empty())
                .map(str::to_owned);
            if cursor.is_none() {
                return Ok(tools);
            }
        }
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolSessionResult<ToolCallOutput> {
        let result = self
            .channel
            .request("tools/call", json!({"name": name, "arguments": arguments}))
            .await?;
        let content = result
            .get("content")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        if result.get("isError").and_then(Value::as_bool) == Some(true) {
            return Err(ToolSessionError::ToolFailed {
                tool: name.to_owned(),
                message: text_of(&content),
            });
        }
        Ok(ToolCallOutput::new(content))
    }
}

impl StreamableHttpSession {
    fn parse_tool(&self, tool: &Value) -> Option<ToolDescriptor> {
        let name = tool.get("name").and_then(Value::as_str).unwrap_or_default();
        let description = tool
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let schema = ToolInputSchema::from_reported(tool.get("inputSchema").cloned());
        match ToolDescriptor::new(name, description, schema) {
            Ok(descriptor) => Some(descriptor),
            Err(err) => {
                warn!(server = %self.channel.server, error = %err, "ignoring listed tool");
                None
            }
        }
    }
}

fn text_of(content: &[Value]) -> String {
    content
        .iter()
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}
