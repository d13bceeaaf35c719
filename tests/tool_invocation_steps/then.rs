//! Then steps for tool invocation BDD scenarios.

use super::world::InvocationWorld;
use eyre::eyre;
use rstest_bdd_macros::then;
use thinkwell::invocation::domain::ChatRole;
use thinkwell::invocation::ports::ToolChoice;

#[then(r"{count:usize} tool calls reached the servers")]
fn tool_calls_reached(world: &InvocationWorld, count: usize) -> Result<(), eyre::Report> {
    let calls = world.connector.calls().len();
    if calls != count {
        return Err(eyre!("expected {count} tool calls, got {calls}"));
    }
    Ok(())
}

#[then(r#"the reply is "{expected}""#)]
fn reply_is(world: &InvocationWorld, expected: String) -> Result<(), eyre::Report> {
    let reply = world.outcome()?.clone().into_reply();
    if reply != expected {
        return Err(eyre!("expected reply '{expected}', got '{reply}'"));
    }
    Ok(())
}

#[then(r#"the reply starts with "{expected}""#)]
fn reply_starts_with(world: &InvocationWorld, expected: String) -> Result<(), eyre::Report> {
    let reply = world.outcome()?.clone().into_reply();
    if !reply.starts_with(&expected) {
        return Err(eyre!("expected reply starting with '{expected}', got '{reply}'"));
    }
    Ok(())
}

#[then(r"the reply reports {count:usize} tool calls used")]
fn reply_reports_calls(world: &InvocationWorld, count: usize) -> Result<(), eyre::Report> {
    let reply = world.outcome()?.clone().into_reply();
    let note = format!("{count} tool calls used");
    if !reply.contains(&note) {
        return Err(eyre!("expected reply to mention '{note}', got '{reply}'"));
    }
    Ok(())
}

#[then("the last engine request disabled tool use")]
fn last_request_disabled_tools(world: &InvocationWorld) -> Result<(), eyre::Report> {
    let requests = world.model.requests();
    let last = requests
        .last()
        .ok_or_else(|| eyre!("engine should have been called"))?;
    if last.tool_choice != ToolChoice::None {
        return Err(eyre!("expected tool use disabled, got {:?}", last.tool_choice));
    }
    Ok(())
}

#[then(r#"the engine received the tool result "{expected}""#)]
fn engine_received_tool_result(
    world: &InvocationWorld,
    expected: String,
) -> Result<(), eyre::Report> {
    let delivered = world.model.requests().iter().any(|request| {
        request
            .messages
            .iter()
            .any(|message| message.role() == ChatRole::Tool && message.content() == expected)
    });
    if !delivered {
        return Err(eyre!("no engine request carried tool result '{expected}'"));
    }
    Ok(())
}

#[then(r"the engine was offered {count:usize} tools")]
fn engine_offered_tools(world: &InvocationWorld, count: usize) -> Result<(), eyre::Report> {
    let requests = world.model.requests();
    let first = requests
        .first()
        .ok_or_else(|| eyre!("engine should have been called"))?;
    if first.tools.len() != count {
        return Err(eyre!("expected {count} offered tools, got {}", first.tools.len()));
    }
    Ok(())
}
