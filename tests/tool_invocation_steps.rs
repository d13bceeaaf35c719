//! Behaviour tests for the tool invocation loop.

#[path = "tool_invocation_steps/mod.rs"]
mod tool_invocation_steps_defs;

use rstest_bdd_macros::scenario;
use tool_invocation_steps_defs::world::{InvocationWorld, world};

#[scenario(
    path = "tests/features/tool_invocation.feature",
    name = "The loop stops calling tools once the budget is spent"
)]
#[tokio::test(flavor = "multi_thread")]
async fn loop_stops_when_budget_is_spent(world: InvocationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tool_invocation.feature",
    name = "A larger budget lets every requested call through"
)]
#[tokio::test(flavor = "multi_thread")]
async fn larger_budget_lets_calls_through(world: InvocationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tool_invocation.feature",
    name = "A failing tool is reported back to the engine"
)]
#[tokio::test(flavor = "multi_thread")]
async fn failing_tool_is_reported(world: InvocationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tool_invocation.feature",
    name = "An unreachable server does not stop the run"
)]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_does_not_stop_run(world: InvocationWorld) {
    let _ = world;
}
