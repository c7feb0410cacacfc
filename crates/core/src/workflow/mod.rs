//! Download workflow.
//!
//! One job runs through four steps: extract the video id, acquire the audio
//! artifact, deliver it, persist the history record. The executor owns the
//! step chain and its error normalization; queueing and cleanup live in the
//! queue module.

mod error;
mod executor;

pub use error::WorkflowError;
pub use executor::{WorkflowExecutor, WorkflowNotice, WorkflowRequest};
