//! Azure OpenAI chat-completions adapter.

use crate::invocation::{
    domain::{ChatCompletion, ChatMessage, ToolCallRequest, ToolSpecification},
    ports::{ChatModel, ChatModelError, ChatModelResult, ChatRequest, ToolChoice},
};
use crate::settings::AzureOpenAiSettings;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

/// Calls a chat deployment on an Azure OpenAI resource with an API key.
#[derive(Debug, Clone)]
pub struct AzureOpenAiChatModel {
    client: Client,
    settings: AzureOpenAiSettings,
    timeout: Duration,
}

impl AzureOpenAiChatModel {
    /// Creates an adapter.
    #[must_use]
    pub const fn new(client: Client, settings: AzureOpenAiSettings, timeout: Duration) -> Self {
        Self {
            client,
            settings,
            timeout,
        }
    }

    /// Returns the chat-completions URL of the deployment.
    ///
    /// # Errors
    ///
    /// Returns [`ChatModelError::InvalidResponse`] if the endpoint cannot
    /// be joined with the deployment path.
    pub fn completions_url(&self) -> ChatModelResult<Url> {
        let base = self.settings.endpoint().as_str().trim_end_matches('/');
        let raw = format!(
            "{base}/openai/deployments/{}/chat/completions",
            self.settings.deployment()
        );
        let mut url: Url = raw
            .parse()
            .map_err(|_| ChatModelError::InvalidResponse(format!("invalid endpoint url {raw}")))?;
        url.query_pairs_mut()
            .append_pair("api-version", self.settings.api_version());
        Ok(url)
    }
}

#[async_trait]
impl ChatModel for AzureOpenAiChatModel {
    async fn complete(&self, request: &ChatRequest) -> ChatModelResult<ChatCompletion> {
        let body = build_request(request, self.settings.temperature());
        debug!(
            deployment = self.settings.deployment(),
            messages = body.messages.len(),
            tools = request.tools.len(),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url()?)
            .timeout(self.timeout)
            .header("api-key", self.settings.api_key())
            .json(&body)
            .send()
            .await
            .map_err(ChatModelError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ChatModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: WireResponse = response.json().await.map_err(ChatModelError::transport)?;
        parse_response(parsed)
    }
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    messages: Vec<WireMessage>,
    temperature: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: WireFunctionDef<'a>,
}

#[derive(Debug, Serialize)]
struct WireFunctionDef<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

fn function_type() -> String {
    "function".to_owned()
}

fn build_request(request: &ChatRequest, temperature: f64) -> WireRequest<'_> {
    let tools: Vec<WireTool<'_>> = request.tools.iter().map(wire_tool).collect();
    let tool_choice = match (tools.is_empty(), request.tool_choice) {
        (true, _) => None,
        (false, ToolChoice::Auto) => Some("auto"),
        (false, ToolChoice::None) => Some("none"),
    };
    WireRequest {
        messages: wire_messages(&request.messages),
        temperature,
        tools,
        tool_choice,
    }
}

fn wire_tool(spec: &ToolSpecification) -> WireTool<'_> {
    WireTool {
        tool_type: "function",
        function: WireFunctionDef {
            name: spec.name(),
            description: spec.description(),
            parameters: spec.parameters(),
        },
    }
}

/// Converts the conversation to wire messages.
///
/// Requested calls that never received a result (unroutable names or calls
/// cut off by the budget) are dropped from assistant messages, since the
/// API rejects unanswered tool calls. An assistant message left with neither
/// text nor calls is dropped entirely, since the API also rejects an
/// assistant turn without content.
fn wire_messages(messages: &[ChatMessage]) -> Vec<WireMessage> {
    let answered: HashSet<&str> = messages
        .iter()
        .filter_map(|message| match message {
            ChatMessage::Tool { call_id, .. } => Some(call_id.as_str()),
            _ => None,
        })
        .collect();

    messages
        .iter()
        .filter_map(|message| match message {
            ChatMessage::System { content } => Some(plain_message("system", content)),
            ChatMessage::User { content } => Some(plain_message("user", content)),
            ChatMessage::Assistant {
                content,
                tool_calls,
            } => {
                let calls: Vec<WireToolCall> = tool_calls
                    .iter()
                    .filter(|call| answered.contains(call.correlation_id().as_str()))
                    .map(wire_tool_call)
                    .collect();
                let text = content
                    .as_ref()
                    .filter(|text| !text.trim().is_empty())
                    .cloned();
                if text.is_none() && calls.is_empty() {
                    return None;
                }
                Some(WireMessage {
                    role: "assistant",
                    content: text,
                    tool_calls: (!calls.is_empty()).then_some(calls),
                    tool_call_id: None,
                })
            }
            ChatMessage::Tool { call_id, content } => Some(WireMessage {
                role: "tool",
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: Some(call_id.clone()),
            }),
        })
        .collect()
}

fn plain_message(role: &'static str, content: &str) -> WireMessage {
    WireMessage {
        role,
        content: Some(content.to_owned()),
        tool_calls: None,
        tool_call_id: None,
    }
}

fn wire_tool_call(call: &ToolCallRequest) -> WireToolCall {
    WireToolCall {
        id: call.correlation_id(),
        call_type: function_type(),
        function: WireFunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.to_string(),
        },
    }
}

fn parse_response(response: WireResponse) -> ChatModelResult<ChatCompletion> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ChatModelError::InvalidResponse("response has no choices".to_owned()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|call| {
            let id = (!call.id.is_empty()).then_some(call.id);
            ToolCallRequest::new(id, call.function.name.clone(), parse_arguments(&call.function))
        })
        .collect();

    Ok(ChatCompletion {
        content: choice.message.content,
        tool_calls,
    })
}

fn parse_arguments(function: &WireFunctionCall) -> Value {
    if function.arguments.trim().is_empty() {
        return Value::Object(Map::new());
    }
    serde_json::from_str(&function.arguments).unwrap_or_else(|err| {
        warn!(tool = %function.name, error = %err, "tool arguments are not valid JSON; sending none");
        Value::Object(Map::new())
    })
}
