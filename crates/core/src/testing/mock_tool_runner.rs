//! Mock tool runner for testing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::supervisor::{SupervisorError, ToolOutput, ToolRunner};

/// Mock implementation of the ToolRunner trait.
///
/// Provides controllable behavior for testing:
/// - Track invocations and their arguments
/// - Canned stdout and streamed lines
/// - Simulate failures and cancellation
/// - Optionally create files on disk, standing in for the tool's artifacts
#[derive(Debug)]
pub struct MockToolRunner {
    /// Recorded argument vectors, one per invocation.
    args: Arc<RwLock<Vec<Vec<String>>>>,
    /// Canned stdout returned on success.
    stdout: Arc<RwLock<String>>,
    /// Lines streamed to the sink before returning.
    lines: Arc<RwLock<Vec<String>>>,
    /// If set, the next run fails with this error.
    next_error: Arc<RwLock<Option<SupervisorError>>>,
    /// Files to create on each run, simulating tool artifacts.
    create_files: Arc<RwLock<Option<(PathBuf, Vec<String>)>>>,
    /// If true, a run blocks until its cancellation token fires.
    hang_until_cancelled: Arc<RwLock<bool>>,
    /// Number of runs that ended by cancellation.
    cancelled: Arc<RwLock<usize>>,
}

impl Default for MockToolRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockToolRunner {
    pub fn new() -> Self {
        Self {
            args: Arc::new(RwLock::new(Vec::new())),
            stdout: Arc::new(RwLock::new(String::new())),
            lines: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            create_files: Arc::new(RwLock::new(None)),
            hang_until_cancelled: Arc::new(RwLock::new(false)),
            cancelled: Arc::new(RwLock::new(0)),
        }
    }

    /// Number of times `run` was invoked.
    pub async fn run_count(&self) -> usize {
        self.args.read().await.len()
    }

    /// All recorded argument vectors.
    pub async fn recorded_args(&self) -> Vec<Vec<String>> {
        self.args.read().await.clone()
    }

    /// Set the stdout returned by the next runs.
    pub async fn set_stdout(&self, stdout: &str) {
        *self.stdout.write().await = stdout.to_string();
    }

    /// Set lines streamed to the line sink during a run.
    pub async fn set_lines(&self, lines: Vec<String>) {
        *self.lines.write().await = lines;
    }

    /// Fail the next run with the given error.
    pub async fn set_next_error(&self, error: SupervisorError) {
        *self.next_error.write().await = Some(error);
    }

    /// Create the named files inside `dir` on each run, simulating the
    /// artifacts a real tool would leave behind.
    pub async fn on_run_create_files(&self, dir: &Path, names: &[&str]) {
        let names = names.iter().map(|n| n.to_string()).collect();
        *self.create_files.write().await = Some((dir.to_path_buf(), names));
    }

    /// Make runs block until cancelled, like a tool that never exits.
    pub async fn set_hang_until_cancelled(&self, hang: bool) {
        *self.hang_until_cancelled.write().await = hang;
    }

    /// Number of runs that ended by cancellation.
    pub async fn cancelled_count(&self) -> usize {
        *self.cancelled.read().await
    }
}

#[async_trait]
impl ToolRunner for MockToolRunner {
    async fn run(
        &self,
        args: &[String],
        lines: Option<mpsc::Sender<String>>,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, SupervisorError> {
        self.args.write().await.push(args.to_vec());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if *self.hang_until_cancelled.read().await {
            cancel.cancelled().await;
            *self.cancelled.write().await += 1;
            return Err(SupervisorError::Cancelled);
        }

        if let Some((dir, names)) = self.create_files.read().await.clone() {
            tokio::fs::create_dir_all(&dir).await?;
            for name in names {
                tokio::fs::write(dir.join(name), b"mock artifact").await?;
            }
        }

        if let Some(sink) = lines {
            for line in self.lines.read().await.iter() {
                let _ = sink.send(line.clone()).await;
            }
        }

        Ok(ToolOutput {
            exit_code: 0,
            stdout: self.stdout.read().await.clone(),
        })
    }
}
