//! Domain model for tool-provider discovery and sessions.
//!
//! The domain models server identity, registry entries, readiness probe
//! results, retry policy, and discovered tool metadata. Network and process
//! concerns remain outside this boundary.

mod backoff;
mod descriptor;
mod error;
mod health;
mod ids;
mod tool;

pub use backoff::BackoffPolicy;
pub use descriptor::{ToolServerDescriptor, ToolServerEntry, UNKNOWN_SERVER_NAME};
pub use error::{ParseHealthStatusError, ToolSessionDomainError};
pub use health::{HealthSnapshot, HealthStatus};
pub use ids::{NAMESPACE_SEPARATOR, ToolServerName};
pub use tool::{ToolDescriptor, ToolInputSchema, empty_object_schema};
