//! Per-run routing table from namespaced tool names to sessions.

use crate::invocation::domain::ToolSpecification;
use crate::tool_session::{
    domain::{ToolDescriptor, ToolServerName},
    ports::{ConnectedSession, ToolCallOutput, ToolSession, ToolSessionError, ToolSessionResult},
};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Failure while assembling the tool catalog of a run.
#[derive(Debug, Clone, Error)]
pub enum CatalogBuildError {
    /// A connected server could not list its tools.
    #[error("failed to list tools of {server}: {source}")]
    Listing {
        /// Server whose catalog failed.
        server: ToolServerName,
        /// Session failure.
        #[source]
        source: ToolSessionError,
    },
}

/// A namespaced tool name bound to its owning session.
#[derive(Clone)]
pub struct NamespacedToolRoute {
    namespaced_name: String,
    server: ToolServerName,
    original_name: String,
    session: Arc<dyn ToolSession>,
}

impl NamespacedToolRoute {
    /// Returns `<server>__<tool>`.
    #[must_use]
    pub fn namespaced_name(&self) -> &str {
        &self.namespaced_name
    }

    /// Returns the owning server.
    #[must_use]
    pub const fn server(&self) -> &ToolServerName {
        &self.server
    }

    /// Returns the tool name as the server knows it.
    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Invokes the tool through its owning session.
    ///
    /// # Errors
    ///
    /// Returns the session's [`ToolSessionError`].
    pub async fn invoke(&self, arguments: Value) -> ToolSessionResult<ToolCallOutput> {
        self.session.call_tool(&self.original_name, arguments).await
    }
}

impl fmt::Debug for NamespacedToolRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespacedToolRoute")
            .field("namespaced_name", &self.namespaced_name)
            .field("server", &self.server)
            .field("original_name", &self.original_name)
            .finish_non_exhaustive()
    }
}

/// Namespaced catalog and routes for one run.
#[derive(Debug, Default)]
pub struct ToolRouteTable {
    routes: HashMap<String, NamespacedToolRoute>,
    specifications: Vec<ToolSpecification>,
}

impl ToolRouteTable {
    /// Lists every connected server's tools and builds the table.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogBuildError::Listing`] when any server fails to list
    /// its tools.
    pub async fn build(sessions: &[ConnectedSession]) -> Result<Self, CatalogBuildError> {
        let mut table = Self::default();
        for connected in sessions {
            let tools = connected.session().list_tools().await.map_err(|source| {
                CatalogBuildError::Listing {
                    server: connected.name().clone(),
                    source,
                }
            })?;
            info!(server = %connected.name(), tools = tools.len(), "listed tool catalog");
            for tool in &tools {
                table.register(connected, tool);
            }
        }
        Ok(table)
    }

    /// Adds a route for `tool`, keeping the first registration of a name.
    ///
    /// Returns `false` when the namespaced name was already routed.
    pub fn register(&mut self, connected: &ConnectedSession, tool: &ToolDescriptor) -> bool {
        let specification = ToolSpecification::from_descriptor(connected.name(), tool);
        let namespaced_name = specification.name().to_owned();
        if self.routes.contains_key(&namespaced_name) {
            warn!(tool = %namespaced_name, "duplicate tool name; keeping first");
            return false;
        }

        self.routes.insert(
            namespaced_name.clone(),
            NamespacedToolRoute {
                namespaced_name,
                server: connected.name().clone(),
                original_name: tool.name().to_owned(),
                session: connected.session(),
            },
        );
        self.specifications.push(specification);
        true
    }

    /// Looks up the route for a namespaced name.
    #[must_use]
    pub fn resolve(&self, namespaced_name: &str) -> Option<&NamespacedToolRoute> {
        self.routes.get(namespaced_name)
    }

    /// Returns the callable specifications in registration order.
    #[must_use]
    pub fn specifications(&self) -> &[ToolSpecification] {
        &self.specifications
    }

    /// Returns the number of routed tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns whether no tool is routed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
