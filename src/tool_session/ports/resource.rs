//! Scoped ownership of network resources opened while connecting.
//!
//! A connector opens transports into a temporary [`ResourceScope`]. When the
//! handshake succeeds the session manager moves the scope's contents into
//! its long-lived scope with [`ResourceScope::absorb`]; when it fails the
//! temporary scope is released and nothing reaches manager state.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// A resource that must be released explicitly.
#[async_trait]
pub trait Releasable: Send + Sync {
    /// Short human-readable label used in logs.
    fn label(&self) -> String;

    /// Releases the resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceReleaseError`] when teardown fails. Callers treat
    /// the resource as released either way.
    async fn release(&self) -> Result<(), ResourceReleaseError>;
}

/// Error returned when a resource fails to release cleanly.
#[derive(Debug, Clone, Error)]
#[error("failed to release {resource}: {source}")]
pub struct ResourceReleaseError {
    /// Label of the resource.
    pub resource: String,
    /// Underlying failure.
    pub source: Arc<dyn std::error::Error + Send + Sync>,
}

impl ResourceReleaseError {
    /// Wraps a teardown failure for the labelled resource.
    pub fn new(
        resource: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            resource: resource.into(),
            source: Arc::new(err),
        }
    }
}

/// Outcome of releasing a scope.
#[derive(Debug, Clone, Default)]
pub struct ReleaseReport {
    released: usize,
    failures: Vec<ResourceReleaseError>,
}

impl ReleaseReport {
    /// Returns how many resources released cleanly.
    #[must_use]
    pub const fn released(&self) -> usize {
        self.released
    }

    /// Returns the failures that were tolerated.
    #[must_use]
    pub fn failures(&self) -> &[ResourceReleaseError] {
        &self.failures
    }
}

/// Ordered group of resources released together, last acquired first.
pub struct ResourceScope {
    label: String,
    resources: Vec<Arc<dyn Releasable>>,
}

impl ResourceScope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            resources: Vec::new(),
        }
    }

    /// Returns the scope label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns how many resources the scope holds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns whether the scope holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Takes ownership of a resource.
    pub fn acquire(&mut self, resource: Arc<dyn Releasable>) {
        debug!(scope = %self.label, resource = %resource.label(), "resource acquired");
        self.resources.push(resource);
    }

    /// Moves every resource of `other` into this scope, preserving order.
    ///
    /// `other` is left empty, so dropping it releases nothing.
    pub fn absorb(&mut self, mut other: Self) {
        debug!(
            scope = %self.label,
            from = %other.label,
            count = other.resources.len(),
            "resources transferred"
        );
        self.resources.append(&mut other.resources);
    }

    /// Releases every resource in reverse acquisition order.
    ///
    /// Failures are logged and collected; every resource is attempted.
    pub async fn release_all(&mut self) -> ReleaseReport {
        release_in_reverse(&self.label, std::mem::take(&mut self.resources)).await
    }
}

/// Releases `resources` last first, collecting failures.
///
/// Works on a plain list so a background release that is dropped before it
/// runs cannot re-enter [`ResourceScope`]'s `Drop`.
async fn release_in_reverse(
    label: &str,
    mut resources: Vec<Arc<dyn Releasable>>,
) -> ReleaseReport {
    let mut report = ReleaseReport::default();
    while let Some(resource) = resources.pop() {
        match resource.release().await {
            Ok(()) => {
                report.released = report.released.saturating_add(1);
            }
            Err(error) => {
                warn!(scope = %label, %error, "resource release failed");
                report.failures.push(error);
            }
        }
    }
    report
}

impl fmt::Debug for ResourceScope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ResourceScope")
            .field("label", &self.label)
            .field("resources", &self.resources.len())
            .finish()
    }
}

impl Drop for ResourceScope {
    fn drop(&mut self) {
        if self.resources.is_empty() {
            return;
        }

        let label = std::mem::take(&mut self.label);
        let orphaned = std::mem::take(&mut self.resources);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(
                    scope = %label,
                    count = orphaned.len(),
                    "scope dropped with live resources; releasing in background"
                );
                handle.spawn(async move {
                    let report = release_in_reverse(&label, orphaned).await;
                    debug!(
                        scope = %label,
                        released = report.released(),
                        failed = report.failures().len(),
                        "background release finished"
                    );
                });
            }
            Err(_) => {
                warn!(
                    scope = %label,
                    count = orphaned.len(),
                    "scope dropped outside a runtime; resources leaked"
                );
            }
        }
    }
}
