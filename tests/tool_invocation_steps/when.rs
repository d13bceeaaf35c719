//! When steps for tool invocation BDD scenarios.

use super::world::{InvocationWorld, run_async};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::when;
use std::sync::Arc;
use std::time::Duration;
use thinkwell::invocation::services::ToolInvocationLoop;
use thinkwell::tool_session::{
    adapters::memory::StaticToolServerRegistry, domain::BackoffPolicy,
    services::ToolSessionManager,
};

#[when(r#"the query "{query}" is answered"#)]
fn answer_query(world: &mut InvocationWorld, query: String) -> Result<(), eyre::Report> {
    let backoff = BackoffPolicy::new(0, Duration::from_millis(10), Duration::from_millis(10))
        .wrap_err("backoff policy should be valid")?;
    let manager = Arc::new(ToolSessionManager::new(
        Arc::new(StaticToolServerRegistry::new(world.entries.clone())),
        Arc::clone(&world.connector),
        Arc::new(DefaultClock),
        backoff,
    ));
    let invocation = ToolInvocationLoop::new(
        Arc::new(world.model.clone()),
        Arc::clone(&manager),
        world.max_tool_calls,
    );

    let outcome = run_async(invocation.run(&query, &[])).wrap_err("run should complete")?;
    let report = run_async(manager.close());
    if !report.failures().is_empty() {
        return Err(eyre::eyre!("session teardown reported failures"));
    }
    world.outcome = Some(outcome);
    Ok(())
}
