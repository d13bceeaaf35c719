//! Step definitions for tool invocation loop scenarios.

pub mod world;

mod given;
mod then;
mod when;
