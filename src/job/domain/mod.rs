//! Domain model for asynchronous jobs.

mod error;
mod ids;
mod job;

pub use error::{JobDomainError, ParseJobStatusError};
pub use ids::JobId;
pub use job::{JobRecord, JobStatus};
