//! External acquisition-tool supervision.
//!
//! Owns the full lifecycle of one yt-dlp invocation: spawn, line-by-line
//! output streaming, terminal-exit detection, and forceful cancellation of the
//! whole process tree.

mod error;
mod traits;
mod ytdlp;

pub use error::SupervisorError;
pub use traits::{ToolOutput, ToolRunner};
pub use ytdlp::{YtdlpRunner, YtdlpRunnerConfig};

use once_cell::sync::Lazy;
use regex_lite::Regex;

static PROGRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[download\]\s+(\d{1,3}(?:\.\d+)?)%").expect("progress pattern compiles")
});

/// Extracts a download percentage from one output line.
///
/// Matches the tool's `[download]  NN.N%` progress lines; anything else yields
/// `None` and is not an error.
pub fn parse_progress(line: &str) -> Option<f32> {
    let caps = PROGRESS_RE.captures(line)?;
    let pct: f32 = caps.get(1)?.as_str().parse().ok()?;
    Some(pct.clamp(0.0, 100.0))
}
