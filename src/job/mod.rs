//! Asynchronous job handling for Thinkwell.
//!
//! A submission records a pending job and generates its reply on a
//! background task; polls report progress and hand out a completed reply
//! exactly once before the record is removed.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
