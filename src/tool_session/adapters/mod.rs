//! Adapter implementations for tool-provider registry and connector ports.

pub mod config_file;
pub mod http;
pub mod memory;

pub use config_file::JsonFileToolServerRegistry;
pub use http::{HttpHealthProbe, StreamableHttpConnector};
pub use memory::{InMemoryToolServerConnector, InMemoryToolSession, StaticToolServerRegistry};
