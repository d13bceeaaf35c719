//! Generation engine replaying queued completions.

use crate::invocation::{
    domain::ChatCompletion,
    ports::{ChatModel, ChatModelError, ChatModelResult, ChatRequest},
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Replays scripted responses in order and records every request.
///
/// Once the script is exhausted every call fails with
/// [`ChatModelError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedChatModel {
    state: Arc<Mutex<ScriptState>>,
}

#[derive(Debug, Default)]
struct ScriptState {
    responses: VecDeque<ChatModelResult<ChatCompletion>>,
    requests: Vec<ChatRequest>,
}

impl ScriptedChatModel {
    /// Creates a model with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model replaying `completions`.
    #[must_use]
    pub fn with_completions(completions: impl IntoIterator<Item = ChatCompletion>) -> Self {
        let model = Self::new();
        for completion in completions {
            model.push_completion(completion);
        }
        model
    }

    /// Appends a successful response to the script.
    pub fn push_completion(&self, completion: ChatCompletion) {
        self.lock().responses.push_back(Ok(completion));
    }

    /// Appends a failure to the script.
    pub fn push_failure(&self, error: ChatModelError) {
        self.lock().responses.push_back(Err(error));
    }

    /// Returns every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, request: &ChatRequest) -> ChatModelResult<ChatCompletion> {
        let mut state = self.lock();
        state.requests.push(request.clone());
        state.responses.pop_front().unwrap_or_else(|| {
            Err(ChatModelError::Unavailable(
                "scripted responses exhausted".to_owned(),
            ))
        })
    }
}
