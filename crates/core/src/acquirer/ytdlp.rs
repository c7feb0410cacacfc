//! yt-dlp backed acquirer implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::traits::Acquirer;
use super::{AcquireError, Acquisition};
use crate::media::{SourceUrl, VideoId};
use crate::supervisor::{parse_progress, ToolRunner};
use crate::thumbnail::ThumbnailProcessor;

/// Audio extensions the tool can leave behind, in no particular order.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "opus", "ogg", "aac", "flac", "wav"];

/// Image extensions `--write-thumbnail` can produce.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Configuration for the yt-dlp acquirer.
#[derive(Debug, Clone)]
pub struct AcquirerConfig {
    /// Root scratch directory; each job gets a subdirectory keyed by video id.
    pub scratch_dir: PathBuf,
    /// Target audio container format.
    pub audio_format: String,
    /// Square thumbnail bound required by the delivery target.
    pub thumbnail_max_dimension: u32,
}

impl Default for AcquirerConfig {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir().join("tubecast"),
            audio_format: "mp3".to_string(),
            thumbnail_max_dimension: 320,
        }
    }
}

/// Production [`Acquirer`] driving yt-dlp through the process supervisor.
pub struct YtdlpAcquirer {
    runner: Arc<dyn ToolRunner>,
    thumbnailer: Arc<dyn ThumbnailProcessor>,
    config: AcquirerConfig,
}

impl YtdlpAcquirer {
    pub fn new(
        runner: Arc<dyn ToolRunner>,
        thumbnailer: Arc<dyn ThumbnailProcessor>,
        config: AcquirerConfig,
    ) -> Self {
        Self {
            runner,
            thumbnailer,
            config,
        }
    }

    fn build_args(&self, url: &SourceUrl, job_dir: &Path, custom_title: Option<&str>) -> Vec<String> {
        let template = match custom_title {
            Some(title) => {
                let safe = sanitize_title(title);
                job_dir.join(format!("{}.%(ext)s", safe))
            }
            None => job_dir.join("%(title)s.%(ext)s"),
        };

        vec![
            "-x".to_string(),
            "--audio-format".to_string(),
            self.config.audio_format.clone(),
            "--embed-metadata".to_string(),
            "--write-thumbnail".to_string(),
            "--no-playlist".to_string(),
            "--newline".to_string(),
            "-o".to_string(),
            template.to_string_lossy().to_string(),
            url.as_str().to_string(),
        ]
    }

    async fn run_tool(
        &self,
        args: &[String],
        progress: mpsc::Sender<f32>,
        cancel: &CancellationToken,
    ) -> Result<(), AcquireError> {
        let (line_tx, mut line_rx) = mpsc::channel::<String>(64);
        let forwarder = tokio::spawn(async move {
            while let Some(line) = line_rx.recv().await {
                if let Some(pct) = parse_progress(&line) {
                    let _ = progress.try_send(pct);
                }
            }
        });

        let result = self.runner.run(args, Some(line_tx), cancel).await;
        let _ = forwarder.await;
        result.map(|_| ()).map_err(AcquireError::from)
    }

    /// Scans the job directory for the newest audio file and, if present, the
    /// newest image file.
    async fn scan_artifacts(
        job_dir: &Path,
    ) -> Result<(Option<PathBuf>, Option<PathBuf>), AcquireError> {
        let mut newest_audio: Option<(SystemTime, PathBuf)> = None;
        let mut newest_image: Option<(SystemTime, PathBuf)> = None;

        let mut entries = tokio::fs::read_dir(job_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            let modified = entry
                .metadata()
                .await?
                .modified()
                .unwrap_or(SystemTime::UNIX_EPOCH);

            let slot = if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
                &mut newest_audio
            } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                &mut newest_image
            } else {
                continue;
            };

            let newer = slot.as_ref().map(|(t, _)| modified > *t).unwrap_or(true);
            if newer {
                *slot = Some((modified, path));
            }
        }

        Ok((
            newest_audio.map(|(_, p)| p),
            newest_image.map(|(_, p)| p),
        ))
    }

    /// Collapses whitespace runs in the filename stem, renaming on disk when
    /// the result differs. The tool does not sanitize titles consistently.
    async fn normalize_filename(path: PathBuf) -> Result<PathBuf, AcquireError> {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return Ok(path);
        };
        let normalized = collapse_whitespace(stem);
        if normalized == stem {
            return Ok(path);
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let new_path = path.with_file_name(format!("{}.{}", normalized, ext));
        tokio::fs::rename(&path, &new_path).await?;
        debug!("normalized filename {} -> {}", path.display(), new_path.display());
        Ok(new_path)
    }

    async fn cleanup_job_dir(job_dir: &Path) {
        if let Err(e) = tokio::fs::remove_dir_all(job_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to clean scratch dir {}: {}", job_dir.display(), e);
            }
        }
    }
}

/// Collapses internal whitespace runs into single spaces and trims the ends.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips characters that would escape the scratch directory or break the
/// output template.
fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '%') { ' ' } else { c })
        .collect();
    collapse_whitespace(&cleaned)
}

#[async_trait]
impl Acquirer for YtdlpAcquirer {
    async fn acquire(
        &self,
        url: &SourceUrl,
        video_id: &VideoId,
        custom_title: Option<&str>,
        progress: mpsc::Sender<f32>,
        cancel: &CancellationToken,
    ) -> Result<Acquisition, AcquireError> {
        let job_dir = self.config.scratch_dir.join(video_id.as_str());
        tokio::fs::create_dir_all(&job_dir).await?;

        let args = self.build_args(url, &job_dir, custom_title);
        if let Err(e) = self.run_tool(&args, progress, cancel).await {
            Self::cleanup_job_dir(&job_dir).await;
            return Err(e);
        }

        let (media, thumbnail) = match Self::scan_artifacts(&job_dir).await {
            Ok(found) => found,
            Err(e) => {
                Self::cleanup_job_dir(&job_dir).await;
                return Err(e);
            }
        };

        let Some(media_path) = media else {
            Self::cleanup_job_dir(&job_dir).await;
            return Err(AcquireError::MediaMissing { dir: job_dir });
        };

        let media_path = Self::normalize_filename(media_path).await?;
        let title = media_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(video_id.as_str())
            .to_string();

        let thumbnail_path = match thumbnail {
            Some(path) => {
                let path = Self::normalize_filename(path).await?;
                match self
                    .thumbnailer
                    .normalize(&path, self.config.thumbnail_max_dimension)
                    .await
                {
                    Ok(()) => Some(path),
                    Err(e) => {
                        // Non-fatal: deliver without a thumbnail rather than
                        // lose the media file.
                        warn!("thumbnail post-processing failed: {}", e);
                        let _ = tokio::fs::remove_file(&path).await;
                        None
                    }
                }
            }
            None => None,
        };

        Ok(Acquisition {
            video_id: video_id.clone(),
            title,
            media_path,
            thumbnail_path,
        })
    }
}
