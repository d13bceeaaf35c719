//! Adapter implementations for the job store port.

pub mod memory;

pub use memory::InMemoryJobStore;
