//! Port contracts for tool-provider discovery and sessions.

mod connector;
mod registry;
mod resource;
mod session;

pub use connector::{ToolServerConnectError, ToolServerConnectResult, ToolServerConnector};
pub use registry::{ToolServerRegistry, ToolServerRegistryError, ToolServerRegistryResult};
pub use resource::{Releasable, ReleaseReport, ResourceReleaseError, ResourceScope};
pub use session::{
    ConnectedSession, ConnectedSessionSource, ToolCallOutput, ToolSession, ToolSessionError,
    ToolSessionResult,
};
