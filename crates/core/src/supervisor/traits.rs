//! Tool runner abstraction.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::SupervisorError;

/// Captured output of a successful tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Always zero on the `Ok` path; kept for mock instrumentation.
    pub exit_code: i32,
    /// Full captured stdout.
    pub stdout: String,
}

/// Runs one invocation of the external acquisition tool.
///
/// Implementations stream every stdout/stderr line to `lines` (when given)
/// while the process runs, and honor `cancel` by killing the process tree and
/// waiting for its actual exit before returning [`SupervisorError::Cancelled`].
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(
        &self,
        args: &[String],
        lines: Option<mpsc::Sender<String>>,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, SupervisorError>;
}
