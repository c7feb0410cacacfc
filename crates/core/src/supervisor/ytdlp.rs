//! yt-dlp process runner.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::traits::{ToolOutput, ToolRunner};
use super::SupervisorError;

/// Number of trailing stderr lines kept for error reporting.
const STDERR_TAIL_LINES: usize = 20;

/// Configuration for the yt-dlp runner.
#[derive(Debug, Clone)]
pub struct YtdlpRunnerConfig {
    /// Path to the yt-dlp binary.
    pub binary: PathBuf,
}

impl Default for YtdlpRunnerConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
        }
    }
}

/// Production [`ToolRunner`] backed by a real yt-dlp subprocess.
pub struct YtdlpRunner {
    config: YtdlpRunnerConfig,
}

impl YtdlpRunner {
    pub fn new(config: YtdlpRunnerConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(YtdlpRunnerConfig::default())
    }

    /// Kills the whole process tree. yt-dlp spawns ffmpeg children, so the
    /// parent alone is not enough; on unix the child runs in its own process
    /// group and the group gets the signal.
    fn kill_tree(child: &mut Child) {
        #[cfg(unix)]
        if let Some(pid) = child.id() {
            // The child was spawned with process_group(0), so its pgid == pid.
            unsafe {
                libc::killpg(pid as libc::pid_t, libc::SIGKILL);
            }
        }
        if let Err(e) = child.start_kill() {
            // Already exited is the common benign case here.
            debug!("start_kill after tree kill: {}", e);
        }
    }
}

#[async_trait]
impl ToolRunner for YtdlpRunner {
    async fn run(
        &self,
        args: &[String],
        lines: Option<mpsc::Sender<String>>,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, SupervisorError> {
        let mut command = Command::new(&self.config.binary);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        command.process_group(0);

        debug!("spawning {:?} {:?}", self.config.binary, args);

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SupervisorError::ToolNotFound {
                    path: self.config.binary.clone(),
                }
            } else {
                SupervisorError::SpawnFailed(e)
            }
        })?;

        let stdout = child.stdout.take().expect("stdout should be captured");
        let stderr = child.stderr.take().expect("stderr should be captured");

        let stdout_sink = lines.clone();
        let stdout_task = tokio::spawn(async move {
            let mut reader = BufReader::new(stdout).lines();
            let mut collected = String::new();
            while let Ok(Some(line)) = reader.next_line().await {
                if let Some(ref tx) = stdout_sink {
                    let _ = tx.send(line.clone()).await;
                }
                collected.push_str(&line);
                collected.push('\n');
            }
            collected
        });

        let stderr_sink = lines;
        let stderr_task = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr).lines();
            let mut tail: Vec<String> = Vec::new();
            while let Ok(Some(line)) = reader.next_line().await {
                if let Some(ref tx) = stderr_sink {
                    let _ = tx.send(line.clone()).await;
                }
                if tail.len() == STDERR_TAIL_LINES {
                    tail.remove(0);
                }
                tail.push(line);
            }
            tail.join("\n")
        });

        let status = tokio::select! {
            _ = cancel.cancelled() => {
                warn!("cancellation requested, killing tool process tree");
                Self::kill_tree(&mut child);
                // The post-kill wait must be unconditional: waiting on the
                // already-cancelled token again would skip reaping the child.
                if let Err(e) = child.wait().await {
                    warn!("wait after kill failed: {}", e);
                }
                let _ = stdout_task.await;
                let _ = stderr_task.await;
                return Err(SupervisorError::Cancelled);
            }
            status = child.wait() => status?,
        };

        let stdout_text = stdout_task.await.unwrap_or_default();
        let stderr_tail = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(SupervisorError::NonZeroExit {
                exit_code: status.code().unwrap_or(-1),
                stderr_tail,
            });
        }

        Ok(ToolOutput {
            exit_code: 0,
            stdout: stdout_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_maps_to_tool_not_found() {
        let runner = YtdlpRunner::new(YtdlpRunnerConfig {
            binary: PathBuf::from("/nonexistent/yt-dlp-for-tests"),
        });
        let cancel = CancellationToken::new();
        let err = runner
            .run(&["--version".to_string()], None, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SupervisorError::ToolNotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_shell_and_captures_stdout() {
        let runner = YtdlpRunner::new(YtdlpRunnerConfig {
            binary: PathBuf::from("/bin/sh"),
        });
        let cancel = CancellationToken::new();
        let output = runner
            .run(
                &["-c".to_string(), "echo hello".to_string()],
                None,
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_carries_stderr_tail() {
        let runner = YtdlpRunner::new(YtdlpRunnerConfig {
            binary: PathBuf::from("/bin/sh"),
        });
        let cancel = CancellationToken::new();
        let err = runner
            .run(
                &["-c".to_string(), "echo boom >&2; exit 3".to_string()],
                None,
                &cancel,
            )
            .await
            .unwrap_err();
        match err {
            SupervisorError::NonZeroExit {
                exit_code,
                stderr_tail,
            } => {
                assert_eq!(exit_code, 3);
                assert!(stderr_tail.contains("boom"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancellation_kills_sleeping_process() {
        let runner = YtdlpRunner::new(YtdlpRunnerConfig {
            binary: PathBuf::from("/bin/sh"),
        });
        let cancel = CancellationToken::new();
        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                cancel.cancel();
            })
        };

        let started = std::time::Instant::now();
        let err = runner
            .run(&["-c".to_string(), "sleep 30".to_string()], None, &cancel)
            .await
            .unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, SupervisorError::Cancelled));
        // Must come back well before the sleep would have finished.
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }
}
