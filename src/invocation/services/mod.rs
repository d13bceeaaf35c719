//! Application services for tool invocation runs.

mod invocation_loop;
mod routes;

pub use invocation_loop::{ToolInvocationError, ToolInvocationLoop, ToolInvocationResult};
pub use routes::{CatalogBuildError, NamespacedToolRoute, ToolRouteTable};
