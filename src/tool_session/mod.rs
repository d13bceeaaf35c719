//! Tool-provider session management for Thinkwell.
//!
//! This module discovers tool-provider servers from a registry document,
//! health-probes them, opens long-lived protocol sessions with capped
//! exponential backoff, and owns the teardown of every resource those
//! sessions acquired. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
