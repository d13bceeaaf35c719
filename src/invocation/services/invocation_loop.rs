//! Bounded multi-round tool invocation driver.

use super::routes::ToolRouteTable;
use crate::invocation::{
    domain::{
        BUDGET_EXHAUSTED_INSTRUCTION, ChatMessage, InvocationDomainError, RunOutcome,
        ToolCallRequest, render_instruction, transcript,
    },
    ports::{ChatModel, ChatModelError, ChatRequest, ToolChoice},
};
use crate::job::ports::{ReplyGenerationError, ReplyGenerationResult, ReplyGenerator};
use crate::tool_session::ports::ConnectedSessionSource;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Characters of tool and final replies kept in log lines.
const LOGGED_REPLY_CHARS: usize = 500;

/// Errors that abort a run.
#[derive(Debug, Clone, Error)]
pub enum ToolInvocationError {
    /// The generation engine failed.
    #[error(transparent)]
    Model(#[from] ChatModelError),

    /// The run could not be prepared.
    #[error(transparent)]
    Domain(#[from] InvocationDomainError),
}

/// Result type for invocation runs.
pub type ToolInvocationResult<T> = Result<T, ToolInvocationError>;

/// Drives the generation engine through tool-call rounds.
///
/// The tool-call budget is shared across all rounds of a run. Tool failures
/// become tool-result messages; only engine failures end a run early.
pub struct ToolInvocationLoop<M, S>
where
    M: ChatModel,
    S: ConnectedSessionSource,
{
    model: Arc<M>,
    sessions: Arc<S>,
    max_tool_calls: usize,
}

impl<M, S> ToolInvocationLoop<M, S>
where
    M: ChatModel,
    S: ConnectedSessionSource,
{
    /// Creates a loop allowing at most `max_tool_calls` invocations per run.
    #[must_use]
    pub const fn new(model: Arc<M>, sessions: Arc<S>, max_tool_calls: usize) -> Self {
        Self {
            model,
            sessions,
            max_tool_calls,
        }
    }

    /// Answers `query`, calling connected tools as the engine requests.
    ///
    /// # Errors
    ///
    /// Returns [`ToolInvocationError`] when the engine fails or the
    /// instruction message cannot be rendered.
    pub async fn run(&self, query: &str, history: &[Value]) -> ToolInvocationResult<RunOutcome> {
        let messages = vec![
            ChatMessage::system(render_instruction(history)?),
            ChatMessage::user(query),
        ];
        info!(history = history.len(), "starting tool invocation run");

        let sessions = self.sessions.connected_sessions().await;
        if sessions.is_empty() {
            info!("no tool servers connected; answering without tools");
            let text = self.plain_answer(&messages).await?;
            return Ok(RunOutcome::NoTools {
                text,
                transcript: transcript(&messages),
            });
        }

        let routes = match ToolRouteTable::build(&sessions).await {
            Ok(routes) => routes,
            Err(catalog_error) => {
                warn!(error = %catalog_error, "tool catalog unavailable; answering without tools");
                let text = self.plain_answer(&messages).await?;
                return Ok(RunOutcome::CatalogFallback {
                    text,
                    transcript: transcript(&messages),
                });
            }
        };
        info!(
            servers = sessions.len(),
            tools = routes.len(),
            "tool catalog assembled"
        );

        self.drive(messages, &routes).await
    }

    /// Alternates engine turns and tool calls until the engine answers.
    ///
    /// Only routed calls spend budget. Termination therefore relies on the
    /// engine: one that keeps requesting unroutable names keeps the loop
    /// going, each turn costing one engine call.
    async fn drive(
        &self,
        mut messages: Vec<ChatMessage>,
        routes: &ToolRouteTable,
    ) -> ToolInvocationResult<RunOutcome> {
        let catalog = routes.specifications().to_vec();
        let mut tool_calls_used: usize = 0;
        loop {
            let request =
                ChatRequest::with_tools(messages.clone(), catalog.clone(), ToolChoice::Auto);
            let completion = self.model.complete(&request).await?;
            if !completion.requests_tools() {
                let text = completion.text_or_empty();
                info!(
                    tool_calls_used,
                    reply = %truncated(&text),
                    "generation finished"
                );
                return Ok(RunOutcome::Final {
                    text,
                    tool_calls_used,
                    transcript: transcript(&messages),
                });
            }

            messages.push(completion.to_message());
            for call in &completion.tool_calls {
                if tool_calls_used >= self.max_tool_calls {
                    info!(
                        max_tool_calls = self.max_tool_calls,
                        "tool call budget reached; forcing final answer"
                    );
                    messages.push(ChatMessage::system(BUDGET_EXHAUSTED_INSTRUCTION));
                    let request = ChatRequest::with_tools(messages, catalog, ToolChoice::None);
                    let text = self.model.complete(&request).await?.text_or_empty();
                    info!(reply = %truncated(&text), "forced final answer received");
                    return Ok(RunOutcome::BudgetExhausted {
                        text,
                        tool_calls_used,
                    });
                }

                let Some(content) = invoke(routes, call).await else {
                    continue;
                };
                tool_calls_used = tool_calls_used.saturating_add(1);
                messages.push(ChatMessage::tool_result(call.correlation_id(), content));
            }
        }
    }

    async fn plain_answer(&self, messages: &[ChatMessage]) -> ToolInvocationResult<String> {
        let completion = self
            .model
            .complete(&ChatRequest::plain(messages.to_vec()))
            .await?;
        Ok(completion.text_or_empty())
    }
}

/// Invokes one requested call; `None` when the name has no route.
async fn invoke(routes: &ToolRouteTable, call: &ToolCallRequest) -> Option<String> {
    let Some(route) = routes.resolve(&call.name) else {
        warn!(tool = %call.name, "no route for requested tool; skipping");
        return None;
    };

    info!(
        tool = %call.name,
        server = %route.server(),
        original = route.original_name(),
        "calling tool"
    );
    let content = match route.invoke(call.arguments.clone()).await {
        Ok(output) => output.to_message_text(),
        Err(tool_error) => {
            warn!(tool = %call.name, error = %tool_error, "tool invocation failed");
            format!("Tool '{}' execution error: {tool_error}", call.name)
        }
    };
    info!(tool = %call.name, reply = %truncated(&content), "tool replied");
    Some(content)
}

fn truncated(text: &str) -> String {
    text.chars().take(LOGGED_REPLY_CHARS).collect()
}

#[async_trait]
impl<M, S> ReplyGenerator for ToolInvocationLoop<M, S>
where
    M: ChatModel,
    S: ConnectedSessionSource,
{
    async fn generate_reply(&self, query: &str, history: &[Value]) -> ReplyGenerationResult<String> {
        self.run(query, history)
            .await
            .map(RunOutcome::into_reply)
            .map_err(ReplyGenerationError::failed)
    }
}
