//! In-memory registry and connector adapters for deterministic tests.
//!
//! These adapters model tool servers without any network traffic. Probe and
//! handshake failures can be scripted per server, tool calls are recorded,
//! and every resource the connector hands out is tracked so tests can
//! assert that nothing leaks.

use crate::tool_session::{
    domain::{HealthSnapshot, ToolDescriptor, ToolServerDescriptor, ToolServerEntry, ToolServerName},
    ports::{
        Releasable, ResourceReleaseError, ResourceScope, ToolCallOutput, ToolServerConnectError,
        ToolServerConnectResult, ToolServerConnector, ToolServerRegistry, ToolServerRegistryError,
        ToolServerRegistryResult, ToolSession, ToolSessionError, ToolSessionResult,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

/// Registry adapter returning a fixed list of entries.
#[derive(Debug, Default)]
pub struct StaticToolServerRegistry {
    entries: Option<Vec<ToolServerEntry>>,
    location: String,
    loads: AtomicUsize,
}

impl StaticToolServerRegistry {
    /// Creates a registry that declares `entries`.
    #[must_use]
    pub fn new(entries: Vec<ToolServerEntry>) -> Self {
        Self {
            entries: Some(entries),
            location: "memory".to_owned(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Creates a registry whose source does not exist.
    #[must_use]
    pub fn missing(location: impl Into<String>) -> Self {
        Self {
            entries: None,
            location: location.into(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Returns how many times the registry was read.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolServerRegistry for StaticToolServerRegistry {
    async fn load_entries(&self) -> ToolServerRegistryResult<Vec<ToolServerEntry>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.entries
            .clone()
            .ok_or_else(|| ToolServerRegistryError::NotFound(self.location.clone()))
    }
}

/// A tool invocation observed by the in-memory connector.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedToolCall {
    /// Server that received the call.
    pub server: ToolServerName,
    /// Tool name as reported by the server.
    pub tool: String,
    /// Arguments passed to the tool.
    pub arguments: Value,
}

#[derive(Debug, Default)]
struct ScriptedServer {
    tools: Vec<ToolDescriptor>,
    catalog_failure: Option<String>,
    failing_tools: HashMap<String, String>,
    outputs: HashMap<String, ToolCallOutput>,
}

#[derive(Debug, Default)]
struct ConnectorState {
    servers: HashMap<ToolServerName, ScriptedServer>,
    probe_failures: HashMap<ToolServerName, usize>,
    handshake_failures: HashMap<ToolServerName, usize>,
    probes: HashMap<ToolServerName, usize>,
    opens: HashMap<ToolServerName, usize>,
    acquired: HashMap<ToolServerName, usize>,
    released: Vec<(ToolServerName, String)>,
    calls: Vec<RecordedToolCall>,
}

/// Connector adapter serving scripted in-memory tool servers.
///
/// Servers that were never added report unhealthy.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToolServerConnector {
    state: Arc<RwLock<ConnectorState>>,
}

impl InMemoryToolServerConnector {
    /// Creates a connector with no servers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> RwLockWriteGuard<'_, ConnectorState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a ready server exposing `tools`. Existing catalogs are replaced.
    pub fn add_server(&self, server: ToolServerName, tools: Vec<ToolDescriptor>) {
        self.state().servers.entry(server).or_default().tools = tools;
    }

    /// Makes the next `times` probes of `server` report unhealthy.
    pub fn fail_probes(&self, server: ToolServerName, times: usize) {
        self.state().probe_failures.insert(server, times);
    }

    /// Makes the next `times` handshakes with `server` fail.
    pub fn fail_handshakes(&self, server: ToolServerName, times: usize) {
        self.state().handshake_failures.insert(server, times);
    }

    /// Makes tool listing on `server` fail with `message`.
    pub fn fail_catalog(&self, server: &ToolServerName, message: impl Into<String>) {
        if let Some(scripted) = self.state().servers.get_mut(server) {
            scripted.catalog_failure = Some(message.into());
        }
    }

    /// Makes calls to `tool` on `server` fail with `message`.
    pub fn fail_tool(&self, server: &ToolServerName, tool: &str, message: impl Into<String>) {
        if let Some(scripted) = self.state().servers.get_mut(server) {
            scripted.failing_tools.insert(tool.to_owned(), message.into());
        }
    }

    /// Sets the output returned by calls to `tool` on `server`.
    pub fn set_tool_output(&self, server: &ToolServerName, tool: &str, output: ToolCallOutput) {
        if let Some(scripted) = self.state().servers.get_mut(server) {
            scripted.outputs.insert(tool.to_owned(), output);
        }
    }

    /// Returns how many times `server` was probed.
    #[must_use]
    pub fn probe_count(&self, server: &ToolServerName) -> usize {
        self.state().probes.get(server).copied().unwrap_or_default()
    }

    /// Returns how many handshakes were attempted with `server`.
    #[must_use]
    pub fn open_count(&self, server: &ToolServerName) -> usize {
        self.state().opens.get(server).copied().unwrap_or_default()
    }

    /// Returns how many resources for `server` are acquired but unreleased.
    #[must_use]
    pub fn live_resources(&self, server: &ToolServerName) -> usize {
        let state = self.state();
        let acquired = state.acquired.get(server).copied().unwrap_or_default();
        let released = state
            .released
            .iter()
            .filter(|(owner, _)| owner == server)
            .count();
        acquired.saturating_sub(released)
    }

    /// Returns resource labels in the order they were released.
    #[must_use]
    pub fn release_order(&self) -> Vec<String> {
        self.state()
            .released
            .iter()
            .map(|(_, label)| label.clone())
            .collect()
    }

    /// Returns every tool call observed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedToolCall> {
        self.state().calls.clone()
    }

    fn track(&self, server: &ToolServerName, kind: &str, scope: &mut ResourceScope) {
        *self.state().acquired.entry(server.clone()).or_default() += 1;
        scope.acquire(Arc::new(TrackedResource {
            server: server.clone(),
            label: format!("{kind}:{server}"),
            state: Arc::clone(&self.state),
        }));
    }
}

fn consume_failure(failures: &mut HashMap<ToolServerName, usize>, server: &ToolServerName) -> bool {
    match failures.get_mut(server) {
        Some(remaining) if *remaining > 0 => {
            *remaining = remaining.saturating_sub(1);
            true
        }
        _ => false,
    }
}

#[async_trait]
impl ToolServerConnector for InMemoryToolServerConnector {
    async fn probe(&self, server: &ToolServerDescriptor) -> HealthSnapshot {
        let mut state = self.state();
        let name = server.name();
        *state.probes.entry(name.clone()).or_default() += 1;

        let checked_at = Utc::now();
        if consume_failure(&mut state.probe_failures, name) {
            return HealthSnapshot::unhealthy(checked_at, "scripted probe failure");
        }
        if !state.servers.contains_key(name) {
            return HealthSnapshot::unhealthy(checked_at, "server not running");
        }
        HealthSnapshot::healthy(checked_at, format!("memory://{name}/health"))
    }

    async fn open(
        &self,
        server: &ToolServerDescriptor,
        scope: &mut ResourceScope,
    ) -> ToolServerConnectResult<Arc<dyn ToolSession>> {
        let name = server.name();
        *self.state().opens.entry(name.clone()).or_default() += 1;
        self.track(name, "transport", scope);

        if consume_failure(&mut self.state().handshake_failures, name) {
            return Err(ToolServerConnectError::Handshake {
                server: name.clone(),
                reason: "scripted handshake failure".to_owned(),
            });
        }

        self.track(name, "session", scope);
        Ok(Arc::new(InMemoryToolSession {
            server: name.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct TrackedResource {
    server: ToolServerName,
    label: String,
    state: Arc<RwLock<ConnectorState>>,
}

#[async_trait]
impl Releasable for TrackedResource {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn release(&self) -> Result<(), ResourceReleaseError> {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .released
            .push((self.server.clone(), self.label.clone()));
        Ok(())
    }
}

/// Session with an in-memory tool server.
#[derive(Debug, Clone)]
pub struct InMemoryToolSession {
    server: ToolServerName,
    state: Arc<RwLock<ConnectorState>>,
}

#[async_trait]
impl ToolSession for InMemoryToolSession {
    async fn list_tools(&self) -> ToolSessionResult<Vec<ToolDescriptor>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let scripted = state
            .servers
            .get(&self.server)
            .ok_or_else(|| ToolSessionError::Closed(self.server.clone()))?;
        if let Some(message) = &scripted.catalog_failure {
            return Err(ToolSessionError::UnexpectedResponse(message.clone()));
        }
        Ok(scripted.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolSessionResult<ToolCallOutput> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.calls.push(RecordedToolCall {
            server: self.server.clone(),
            tool: name.to_owned(),
            arguments,
        });

        let scripted = state
            .servers
            .get(&self.server)
            .ok_or_else(|| ToolSessionError::Closed(self.server.clone()))?;
        if let Some(message) = scripted.failing_tools.get(name) {
            return Err(ToolSessionError::ToolFailed {
                tool: name.to_owned(),
                message: message.clone(),
            });
        }
        Ok(scripted
            .outputs
            .get(name)
            .cloned()
            .unwrap_or_else(|| ToolCallOutput::text(format!("{name} ok"))))
    }
}
