//! Thinkwell: tool-augmented question answering over MCP tool servers.
//!
//! The crate connects to a set of tool-provider servers, exposes their
//! tools to a chat-completion engine, and answers queries asynchronously
//! through a submit/poll HTTP interface.
//!
//! # Architecture
//!
//! Thinkwell follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (HTTP, files, memory)
//!
//! # Modules
//!
//! - [`tool_session`]: Tool-server discovery, health probing and sessions
//! - [`invocation`]: The bounded tool-calling loop around the engine
//! - [`job`]: Asynchronous job records and the submit/poll workflow
//! - [`api`]: HTTP boundary
//! - [`settings`]: Environment-driven configuration

pub mod api;
pub mod invocation;
pub mod job;
pub mod settings;
pub mod tool_session;
