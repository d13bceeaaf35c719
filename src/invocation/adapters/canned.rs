//! Deterministic stand-in used when no generation engine is configured.

use crate::invocation::{
    domain::{ChatCompletion, ChatMessage},
    ports::{ChatModel, ChatModelResult, ChatRequest},
};
use async_trait::async_trait;
use std::time::Duration;

/// Answers every request with a fixed reply after a delay.
#[derive(Debug, Clone, Copy)]
pub struct CannedReplyModel {
    delay: Duration,
}

impl CannedReplyModel {
    /// Creates a model answering after `delay`.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for CannedReplyModel {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl ChatModel for CannedReplyModel {
    async fn complete(&self, request: &ChatRequest) -> ChatModelResult<ChatCompletion> {
        tokio::time::sleep(self.delay).await;
        let query = request
            .messages
            .iter()
            .rev()
            .find_map(|message| match message {
                ChatMessage::User { content } => Some(content.as_str()),
                _ => None,
            })
            .unwrap_or_default();
        Ok(ChatCompletion::text(format!(
            "Response to '{query}' is that SITMD is a short hand for Super Intelligent Teleport Master Data."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn replies_after_delay_quoting_the_query() {
        let model = CannedReplyModel::new(Duration::from_secs(2));
        let request = ChatRequest::plain(vec![
            ChatMessage::system("policy"),
            ChatMessage::user("capital of France"),
        ]);
        let started = tokio::time::Instant::now();

        let completion = model.complete(&request).await.expect("canned reply");

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(
            completion
                .text_or_empty()
                .starts_with("Response to 'capital of France'")
        );
        assert!(!completion.requests_tools());
    }
}
