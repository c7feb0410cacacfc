//! Sequential download queue.
//!
//! Jobs run strictly one at a time, in submission order. A single worker task
//! is started lazily on submission and exits when the queue drains; an atomic
//! flag guarantees at most one worker exists at any moment.

mod orchestrator;
mod types;

pub use orchestrator::DownloadQueue;
pub use types::{Job, JobEvent, JobStatus, QueueError};
