//! Application services for asynchronous jobs.

mod think;

pub use think::{JobPoll, SubmittedJob, ThinkService, ThinkServiceError, ThinkServiceResult};
