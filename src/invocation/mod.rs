//! Tool invocation loop for Thinkwell.
//!
//! A run renders the instruction message, snapshots the connected tool
//! sessions, builds a namespaced tool catalog, and drives the generation
//! engine through tool-call rounds until it answers or the shared call
//! budget runs out.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
