//! Video-id extraction.
//!
//! Two-tier strategy: a compiled pattern match over the known URL shapes, and
//! a metadata-only tool invocation (`--print id`, no download) when the fast
//! path comes up empty. The fast path always wins when it produces a
//! structurally valid id; it is never cross-validated against the subprocess.

mod error;

pub use error::ExtractorError;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::media::{SourceUrl, VideoId};
use crate::supervisor::ToolRunner;

/// Known URL shapes, each capturing the 11-character id.
static FAST_PATH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Query-parameter form: watch?v=<id>
        r"[?&]v=([A-Za-z0-9_-]{11})(?:[&#]|$)",
        // Short-link form: youtu.be/<id>
        r"youtu\.be/([A-Za-z0-9_-]{11})(?:[?&#/]|$)",
        // Path-segment forms: /shorts/<id>, /embed/<id>, /live/<id>, /v/<id>
        r"/(?:shorts|embed|live|v)/([A-Za-z0-9_-]{11})(?:[?&#/]|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("fast-path pattern compiles"))
    .collect()
});

/// Extracts the [`VideoId`] for a source URL.
pub struct IdExtractor {
    runner: Arc<dyn ToolRunner>,
}

impl IdExtractor {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner }
    }

    /// Extracts the id, preferring the zero-cost pattern match.
    pub async fn extract(
        &self,
        url: &SourceUrl,
        cancel: &CancellationToken,
    ) -> Result<VideoId, ExtractorError> {
        if let Some(id) = Self::fast_path(url) {
            debug!("fast-path id match for {}: {}", url, id);
            return Ok(id);
        }
        self.tool_fallback(url, cancel).await
    }

    /// Pattern match against the known URL shapes, validating the capture.
    fn fast_path(url: &SourceUrl) -> Option<VideoId> {
        for pattern in FAST_PATH_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(url.as_str()) {
                if let Some(m) = caps.get(1) {
                    if let Ok(id) = VideoId::new(m.as_str()) {
                        return Some(id);
                    }
                }
            }
        }
        None
    }

    /// Metadata-only tool invocation: prints the id without downloading.
    async fn tool_fallback(
        &self,
        url: &SourceUrl,
        cancel: &CancellationToken,
    ) -> Result<VideoId, ExtractorError> {
        debug!("fast path missed for {}, falling back to tool", url);
        let args = vec![
            "--print".to_string(),
            "id".to_string(),
            "--skip-download".to_string(),
            "--no-playlist".to_string(),
            url.as_str().to_string(),
        ];
        let output = self.runner.run(&args, None, cancel).await?;

        let printed = output.stdout.trim();
        if printed.chars().count() != VideoId::LENGTH {
            return Err(ExtractorError::InvalidIdLength {
                value: printed.to_string(),
            });
        }
        Ok(VideoId::new(printed)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::SupervisorError;
    use crate::testing::MockToolRunner;

    fn url(s: &str) -> SourceUrl {
        SourceUrl::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_fast_path_query_parameter_form() {
        let runner = Arc::new(MockToolRunner::new());
        let extractor = IdExtractor::new(runner.clone());
        let cancel = CancellationToken::new();

        let id = extractor
            .extract(&url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), &cancel)
            .await
            .unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
        // No subprocess cost on the fast path.
        assert_eq!(runner.run_count().await, 0);
    }

    #[tokio::test]
    async fn test_fast_path_short_link_and_path_forms() {
        let runner = Arc::new(MockToolRunner::new());
        let extractor = IdExtractor::new(runner);
        let cancel = CancellationToken::new();

        for u in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=10",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ?feature=share",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123",
        ] {
            let id = extractor.extract(&url(u), &cancel).await.unwrap();
            assert_eq!(id.as_str(), "dQw4w9WgXcQ", "for {}", u);
        }
    }

    #[tokio::test]
    async fn test_fallback_uses_tool_stdout() {
        let runner = Arc::new(MockToolRunner::new());
        runner.set_stdout("dQw4w9WgXcQ\n").await;
        let extractor = IdExtractor::new(runner.clone());
        let cancel = CancellationToken::new();

        // No recognizable id in the URL shape.
        let id = extractor
            .extract(&url("https://www.youtube.com/playlist?list=PL4fG"), &cancel)
            .await
            .unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
        assert_eq!(runner.run_count().await, 1);

        let args = runner.recorded_args().await;
        assert!(args[0].contains(&"--print".to_string()));
        assert!(args[0].contains(&"--skip-download".to_string()));
    }

    #[tokio::test]
    async fn test_fallback_rejects_wrong_length_output() {
        let runner = Arc::new(MockToolRunner::new());
        runner.set_stdout("not-an-id\n").await;
        let extractor = IdExtractor::new(runner);
        let cancel = CancellationToken::new();

        let err = extractor
            .extract(&url("https://www.youtube.com/playlist?list=PL4fG"), &cancel)
            .await
            .unwrap_err();
        match err {
            ExtractorError::InvalidIdLength { value } => assert_eq!(value, "not-an-id"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fallback_surfaces_tool_exit_code() {
        let runner = Arc::new(MockToolRunner::new());
        runner
            .set_next_error(SupervisorError::NonZeroExit {
                exit_code: 1,
                stderr_tail: "ERROR: unsupported URL".to_string(),
            })
            .await;
        let extractor = IdExtractor::new(runner);
        let cancel = CancellationToken::new();

        let err = extractor
            .extract(&url("https://www.youtube.com/playlist?list=PL4fG"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractorError::Tool(SupervisorError::NonZeroExit { exit_code: 1, .. })
        ));
    }
}
