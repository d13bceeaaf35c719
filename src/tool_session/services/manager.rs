//! Long-lived manager for tool-provider sessions.

use crate::tool_session::{
    domain::{BackoffPolicy, ToolServerDescriptor, ToolServerEntry, ToolSessionDomainError},
    ports::{
        ConnectedSession, ConnectedSessionSource, ReleaseReport, ResourceScope,
        ToolServerConnectError, ToolServerConnector, ToolServerRegistry, ToolServerRegistryError,
    },
};
use async_trait::async_trait;
use futures_util::future::join_all;
use mockable::Clock;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Session snapshot shared with every reader.
pub type SessionSnapshot = Arc<[ConnectedSession]>;

/// Discovers, connects, and owns sessions with tool-provider servers.
///
/// The manager is constructed once by the process entry point and shared by
/// reference. [`ToolSessionManager::initialize`] runs the connection pass at
/// most once until [`ToolSessionManager::close`] resets it; readers of an
/// initialized snapshot never contend on the initialization lock.
pub struct ToolSessionManager<R, N, C>
where
    R: ToolServerRegistry,
    N: ToolServerConnector,
    C: Clock + Send + Sync,
{
    registry: Arc<R>,
    connector: Arc<N>,
    clock: Arc<C>,
    backoff: BackoffPolicy,
    resources: Mutex<ResourceScope>,
    snapshot: RwLock<Option<SessionSnapshot>>,
}

impl<R, N, C> ToolSessionManager<R, N, C>
where
    R: ToolServerRegistry,
    N: ToolServerConnector,
    C: Clock + Send + Sync,
{
    /// Creates an uninitialized manager.
    #[must_use]
    pub fn new(registry: Arc<R>, connector: Arc<N>, clock: Arc<C>, backoff: BackoffPolicy) -> Self {
        Self {
            registry,
            connector,
            clock,
            backoff,
            resources: Mutex::new(ResourceScope::new("tool session manager")),
            snapshot: RwLock::new(None),
        }
    }

    /// Returns whether a connection pass has completed since the last close.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.current_snapshot().is_some()
    }

    /// Connects to every declared server, once.
    ///
    /// Concurrent callers wait for the first caller's pass and then observe
    /// its snapshot. A missing or unreadable registry yields an empty
    /// snapshot.
    pub async fn initialize(&self) -> SessionSnapshot {
        if let Some(snapshot) = self.current_snapshot() {
            return snapshot;
        }

        let mut resources = self.resources.lock().await;
        if let Some(snapshot) = self.current_snapshot() {
            return snapshot;
        }

        info!("initializing tool session manager");
        let entries = self.load_entries().await;
        let sessions = self.connect_all(&entries, &mut resources).await;
        let snapshot: SessionSnapshot = sessions.into();
        self.store_snapshot(Some(Arc::clone(&snapshot)));
        info!(
            connected = snapshot.len(),
            declared = entries.len(),
            "tool session manager initialized"
        );
        snapshot
    }

    /// Returns the current snapshot, initializing first if needed.
    pub async fn get_connected_servers(&self) -> SessionSnapshot {
        match self.current_snapshot() {
            Some(snapshot) => snapshot,
            None => self.initialize().await,
        }
    }

    /// Connects to each declared server independently.
    ///
    /// Entries without an address, with an invalid name or address, or
    /// repeating an earlier name are skipped. Every other server is probed
    /// and connected with retries; servers that exhaust their attempts are
    /// left out. Resources of successful connections are moved into
    /// `durable` in declaration order.
    pub async fn connect_all(
        &self,
        entries: &[ToolServerEntry],
        durable: &mut ResourceScope,
    ) -> Vec<ConnectedSession> {
        let descriptors = admissible_descriptors(entries);
        let attempts = descriptors
            .iter()
            .map(|descriptor| self.connect_with_retry(descriptor));

        let mut sessions = Vec::with_capacity(descriptors.len());
        for (session, scope) in join_all(attempts).await.into_iter().flatten() {
            durable.absorb(scope);
            sessions.push(session);
        }
        sessions
    }

    /// Releases every resource ever handed to the manager and resets it.
    pub async fn close(&self) -> ReleaseReport {
        let mut resources = self.resources.lock().await;
        info!(resources = resources.len(), "closing tool session manager");
        let report = resources.release_all().await;
        self.store_snapshot(None);
        info!(
            released = report.released(),
            failed = report.failures().len(),
            "tool session manager closed"
        );
        report
    }

    async fn load_entries(&self) -> Vec<ToolServerEntry> {
        match self.registry.load_entries().await {
            Ok(entries) => entries,
            Err(ToolServerRegistryError::NotFound(location)) => {
                warn!(%location, "tool server registry not found; continuing without tools");
                Vec::new()
            }
            Err(registry_error) => {
                error!(error = %registry_error, "failed to load tool server registry; continuing without tools");
                Vec::new()
            }
        }
    }

    async fn connect_with_retry(
        &self,
        descriptor: &ToolServerDescriptor,
    ) -> Option<(ConnectedSession, ResourceScope)> {
        let mut attempt: u32 = 1;
        loop {
            match self.connect_once(descriptor).await {
                Ok(connected) => {
                    info!(
                        server = %descriptor.name(),
                        address = %descriptor.address(),
                        attempt,
                        "connected to tool server"
                    );
                    return Some(connected);
                }
                Err(connect_error) if self.backoff.has_attempt_after(attempt) => {
                    let delay = self.backoff.delay_after(attempt);
                    warn!(
                        server = %descriptor.name(),
                        attempt,
                        ?delay,
                        error = %connect_error,
                        "tool server connection attempt failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt = attempt.saturating_add(1);
                }
                Err(connect_error) => {
                    error!(
                        server = %descriptor.name(),
                        attempts = attempt,
                        error = %connect_error,
                        "giving up on tool server"
                    );
                    return None;
                }
            }
        }
    }

    async fn connect_once(
        &self,
        descriptor: &ToolServerDescriptor,
    ) -> Result<(ConnectedSession, ResourceScope), ToolServerConnectError> {
        let health = self.connector.probe(descriptor).await;
        if !health.is_healthy() {
            return Err(ToolServerConnectError::Unhealthy {
                server: descriptor.name().clone(),
                reason: health.message().unwrap_or("no healthy endpoint").to_owned(),
            });
        }
        debug!(
            server = %descriptor.name(),
            endpoint = health.endpoint().unwrap_or_default(),
            "tool server is ready"
        );

        let mut scope = ResourceScope::new(format!("connect {}", descriptor.name()));
        match self.connector.open(descriptor, &mut scope).await {
            Ok(session) => {
                let connected =
                    ConnectedSession::new(descriptor.clone(), session, health, self.clock.utc());
                Ok((connected, scope))
            }
            Err(open_error) => {
                let report = scope.release_all().await;
                debug!(
                    server = %descriptor.name(),
                    released = report.released(),
                    failed = report.failures().len(),
                    "released partial connection"
                );
                Err(open_error)
            }
        }
    }

    fn current_snapshot(&self) -> Option<SessionSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_snapshot(&self, snapshot: Option<SessionSnapshot>) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

#[async_trait]
impl<R, N, C> ConnectedSessionSource for ToolSessionManager<R, N, C>
where
    R: ToolServerRegistry,
    N: ToolServerConnector,
    C: Clock + Send + Sync,
{
    async fn connected_sessions(&self) -> SessionSnapshot {
        self.get_connected_servers().await
    }
}

fn admissible_descriptors(entries: &[ToolServerEntry]) -> Vec<ToolServerDescriptor> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(|entry| match ToolServerDescriptor::try_from_entry(entry) {
            Ok(descriptor) => Some(descriptor),
            Err(ToolSessionDomainError::MissingAddress(name)) => {
                warn!(server = %name, "skipping tool server without address");
                None
            }
            Err(invalid) => {
                warn!(server = %entry.name, error = %invalid, "skipping invalid tool server entry");
                None
            }
        })
        .filter(|descriptor| {
            let first = seen.insert(descriptor.name().clone());
            if !first {
                warn!(server = %descriptor.name(), "skipping duplicate tool server name");
            }
            first
        })
        .collect()
}
