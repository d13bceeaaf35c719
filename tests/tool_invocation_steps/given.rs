//! Given steps for tool invocation BDD scenarios.

use super::world::InvocationWorld;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serde_json::json;
use thinkwell::invocation::domain::{ChatCompletion, ToolCallRequest};
use thinkwell::tool_session::domain::{
    ToolDescriptor, ToolInputSchema, ToolServerEntry, ToolServerName,
};

fn add_server(world: &mut InvocationWorld, server: &str, tool: &str) -> Result<(), eyre::Report> {
    let descriptor = ToolDescriptor::new(tool, format!("Tool {tool}"), ToolInputSchema::Absent)
        .wrap_err("tool descriptor should be valid")?;
    world.connector.add_server(
        ToolServerName::new(server).wrap_err("valid server name expected")?,
        vec![descriptor],
    );
    world.entries.push(ToolServerEntry::new(
        server,
        format!("http://tools.local/{server}/mcp"),
    ));
    Ok(())
}

fn call(id: &str, name: &str) -> ToolCallRequest {
    ToolCallRequest::new(Some(id.to_owned()), name, json!({"request": id}))
}

#[given(
    r#"connected tool servers "{first}" with tool "{first_tool}" and "{second}" with tool "{second_tool}""#
)]
fn connected_servers(
    world: &mut InvocationWorld,
    first: String,
    first_tool: String,
    second: String,
    second_tool: String,
) -> Result<(), eyre::Report> {
    add_server(world, &first, &first_tool)?;
    add_server(world, &second, &second_tool)
}

#[given(r"a tool call budget of {budget:usize}")]
fn tool_call_budget(world: &mut InvocationWorld, budget: usize) {
    world.max_tool_calls = budget;
}

#[given(r#"the engine requests 3 tool calls and then answers "{answer}""#)]
fn engine_requests_three_calls(world: &mut InvocationWorld, answer: String) {
    world.model.push_completion(ChatCompletion::tool_calls(vec![
        call("c1", "web_docs__fetch"),
        call("c2", "date__now"),
        call("c3", "web_docs__fetch"),
    ]));
    world.model.push_completion(ChatCompletion::text(answer));
}

#[given(r#"the engine calls "{tool}" and then answers "{answer}""#)]
fn engine_calls_one_tool(world: &mut InvocationWorld, tool: String, answer: String) {
    world
        .model
        .push_completion(ChatCompletion::tool_calls(vec![call("c1", &tool)]));
    world.model.push_completion(ChatCompletion::text(answer));
}

#[given(r#"tool "{tool}" on "{server}" fails with "{message}""#)]
fn failing_tool(
    world: &mut InvocationWorld,
    tool: String,
    server: String,
    message: String,
) -> Result<(), eyre::Report> {
    let name = ToolServerName::new(server).wrap_err("valid server name expected")?;
    world.connector.fail_tool(&name, &tool, message);
    Ok(())
}

#[given(r#"a registered server "{name}" that is not running"#)]
fn unreachable_server(world: &mut InvocationWorld, name: String) {
    world.entries.push(ToolServerEntry::new(
        &name,
        format!("http://tools.local/{name}/mcp"),
    ));
}
