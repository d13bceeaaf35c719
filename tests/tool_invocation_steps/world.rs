//! Shared world state for tool invocation BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use thinkwell::invocation::{adapters::ScriptedChatModel, domain::RunOutcome};
use thinkwell::tool_session::{
    adapters::memory::{InMemoryToolServerConnector, StaticToolServerRegistry},
    domain::ToolServerEntry,
    services::ToolSessionManager,
};

/// Session manager type used by the BDD world.
pub type TestManager =
    ToolSessionManager<StaticToolServerRegistry, InMemoryToolServerConnector, DefaultClock>;

/// Scenario world for tool invocation behaviour tests.
#[derive(Default)]
pub struct InvocationWorld {
    pub connector: Arc<InMemoryToolServerConnector>,
    pub entries: Vec<ToolServerEntry>,
    pub model: ScriptedChatModel,
    pub max_tool_calls: usize,
    pub outcome: Option<RunOutcome>,
}

impl InvocationWorld {
    /// Returns the outcome of the answered query.
    pub fn outcome(&self) -> Result<&RunOutcome, eyre::Report> {
        self.outcome
            .as_ref()
            .ok_or_else(|| eyre::eyre!("query should have been answered"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> InvocationWorld {
    InvocationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
