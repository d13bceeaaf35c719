//! Terminal results of a tool invocation run.

/// How a run produced its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The engine answered after zero or more tool rounds.
    Final {
        /// Answer text.
        text: String,
        /// Tool invocations performed.
        tool_calls_used: usize,
        /// Conversation transcript.
        transcript: String,
    },
    /// The budget ran out and the engine was forced to answer.
    BudgetExhausted {
        /// Answer text.
        text: String,
        /// Tool invocations performed.
        tool_calls_used: usize,
    },
    /// No tool servers were connected.
    NoTools {
        /// Answer text.
        text: String,
        /// Conversation transcript.
        transcript: String,
    },
    /// Building the tool catalog failed and the engine answered without tools.
    CatalogFallback {
        /// Answer text.
        text: String,
        /// Conversation transcript.
        transcript: String,
    },
}

impl RunOutcome {
    /// Returns the unannotated answer text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Final { text, .. }
            | Self::BudgetExhausted { text, .. }
            | Self::NoTools { text, .. }
            | Self::CatalogFallback { text, .. } => text,
        }
    }

    /// Returns how many tool invocations the run performed.
    #[must_use]
    pub const fn tool_calls_used(&self) -> usize {
        match self {
            Self::Final {
                tool_calls_used, ..
            }
            | Self::BudgetExhausted {
                tool_calls_used, ..
            } => *tool_calls_used,
            Self::NoTools { .. } | Self::CatalogFallback { .. } => 0,
        }
    }

    /// Renders the reply delivered to the caller, with accounting notes.
    #[must_use]
    pub fn into_reply(self) -> String {
        match self {
            Self::Final {
                text,
                tool_calls_used,
                transcript,
            } => format!(
                "{text}\n\n#Technical details\n\n{tool_calls_used} tool calls used\n\nraw messages: {transcript}"
            ),
            Self::BudgetExhausted { text, .. } => text,
            Self::NoTools { text, transcript } => format!(
                "No MCP tools used. Plain LLM call without MCP tools: \n{text}\n\nraw messages: {transcript}"
            ),
            Self::CatalogFallback { text, transcript } => format!(
                "Tool catalog unavailable, answered without tools: \n{text}\n\nraw messages: {transcript}"
            ),
        }
    }
}
