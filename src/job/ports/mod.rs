//! Port contracts for the job context.

mod generator;
mod store;

pub use generator::{ReplyGenerationError, ReplyGenerationResult, ReplyGenerator};
pub use store::{JobStore, JobStoreError, JobStoreResult};
