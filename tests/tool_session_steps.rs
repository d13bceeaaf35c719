//! Behaviour tests for tool server discovery, connection and teardown.

use std::sync::Arc;
use std::time::Duration;

use eyre::{WrapErr, eyre};
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use thinkwell::tool_session::{
    adapters::memory::{InMemoryToolServerConnector, StaticToolServerRegistry},
    domain::{BackoffPolicy, ToolDescriptor, ToolInputSchema, ToolServerEntry, ToolServerName},
    ports::ReleaseReport,
    services::{SessionSnapshot, ToolSessionManager},
};

type TestManager =
    ToolSessionManager<StaticToolServerRegistry, InMemoryToolServerConnector, DefaultClock>;

#[derive(Default)]
struct SessionWorld {
    connector: Arc<InMemoryToolServerConnector>,
    entries: Vec<ToolServerEntry>,
    manager: Option<TestManager>,
    snapshot: Option<SessionSnapshot>,
    close_report: Option<ReleaseReport>,
}

impl SessionWorld {
    fn manager(&self) -> Result<&TestManager, eyre::Report> {
        self.manager
            .as_ref()
            .ok_or_else(|| eyre!("session manager should exist"))
    }

    fn snapshot(&self) -> Result<&SessionSnapshot, eyre::Report> {
        self.snapshot
            .as_ref()
            .ok_or_else(|| eyre!("manager should have been initialized"))
    }

    fn register(&mut self, name: &str) {
        self.entries.push(ToolServerEntry::new(
            name,
            format!("http://tools.local/{name}/mcp"),
        ));
    }
}

#[fixture]
fn world() -> SessionWorld {
    SessionWorld::default()
}

fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn server_name(name: &str) -> Result<ToolServerName, eyre::Report> {
    ToolServerName::new(name).wrap_err("valid server name expected")
}

#[given(r#"a tool server "{name}" exposing tool "{tool}""#)]
fn ready_server(world: &mut SessionWorld, name: String, tool: String) -> Result<(), eyre::Report> {
    let descriptor = ToolDescriptor::new(&tool, format!("Tool {tool}"), ToolInputSchema::Absent)
        .wrap_err("tool descriptor should be valid")?;
    world
        .connector
        .add_server(server_name(&name)?, vec![descriptor]);
    world.register(&name);
    Ok(())
}

#[given(r#"a registered server "{name}" that is not running"#)]
fn unreachable_server(world: &mut SessionWorld, name: String) {
    world.register(&name);
}

#[when("the session manager initializes")]
fn initialize_manager(world: &mut SessionWorld) -> Result<(), eyre::Report> {
    let backoff = BackoffPolicy::new(3, Duration::from_millis(10), Duration::from_millis(20))
        .wrap_err("backoff policy should be valid")?;
    let manager = ToolSessionManager::new(
        Arc::new(StaticToolServerRegistry::new(world.entries.clone())),
        Arc::clone(&world.connector),
        Arc::new(DefaultClock),
        backoff,
    );
    world.snapshot = Some(run_async(manager.initialize()));
    world.manager = Some(manager);
    Ok(())
}

#[when("the session manager is closed")]
fn close_manager(world: &mut SessionWorld) -> Result<(), eyre::Report> {
    let report = run_async(world.manager()?.close());
    world.close_report = Some(report);
    Ok(())
}

#[then(r"{count:usize} servers are connected")]
fn connected_count(world: &SessionWorld, count: usize) -> Result<(), eyre::Report> {
    let connected = world.snapshot()?.len();
    if connected != count {
        return Err(eyre!("expected {count} connected servers, got {connected}"));
    }
    Ok(())
}

#[then(r#"the connected servers are "{names}""#)]
fn connected_names(world: &SessionWorld, names: String) -> Result<(), eyre::Report> {
    let actual: Vec<&str> = world
        .snapshot()?
        .iter()
        .map(|session| session.name().as_str())
        .collect();
    let expected: Vec<&str> = names.split(',').collect();
    if actual != expected {
        return Err(eyre!("expected servers {expected:?}, got {actual:?}"));
    }
    Ok(())
}

#[then(r#"server "{name}" was contacted {count:usize} times"#)]
fn contact_count(world: &SessionWorld, name: String, count: usize) -> Result<(), eyre::Report> {
    let probes = world.connector.probe_count(&server_name(&name)?);
    if probes != count {
        return Err(eyre!("expected {count} health checks of {name}, got {probes}"));
    }
    if world.connector.open_count(&server_name(&name)?) != 0 {
        return Err(eyre!("unreachable server {name} should never be opened"));
    }
    Ok(())
}

#[then(r"{count:usize} resources were released")]
fn released_count(world: &SessionWorld, count: usize) -> Result<(), eyre::Report> {
    let report = world
        .close_report
        .as_ref()
        .ok_or_else(|| eyre!("manager should have been closed"))?;
    if report.released() != count || !report.failures().is_empty() {
        return Err(eyre!(
            "expected {count} clean releases, got {} with {} failures",
            report.released(),
            report.failures().len()
        ));
    }
    Ok(())
}

#[then(r#"no resources remain live for "{name}""#)]
fn nothing_live(world: &SessionWorld, name: String) -> Result<(), eyre::Report> {
    let live = world.connector.live_resources(&server_name(&name)?);
    if live != 0 {
        return Err(eyre!("expected no live resources for {name}, got {live}"));
    }
    Ok(())
}

#[scenario(
    path = "tests/features/tool_sessions.feature",
    name = "Ready servers are connected at start-up"
)]
#[tokio::test(flavor = "multi_thread")]
async fn ready_servers_are_connected(world: SessionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tool_sessions.feature",
    name = "An unreachable server is excluded after its retries"
)]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_excluded(world: SessionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tool_sessions.feature",
    name = "Closing the manager releases every session"
)]
#[tokio::test(flavor = "multi_thread")]
async fn closing_releases_every_session(world: SessionWorld) {
    let _ = world;
}
