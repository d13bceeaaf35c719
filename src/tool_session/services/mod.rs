//! Application services for tool-provider sessions.

mod manager;

pub use manager::{SessionSnapshot, ToolSessionManager};
