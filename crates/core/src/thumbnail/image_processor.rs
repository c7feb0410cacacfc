//! image-crate backed thumbnail processor.

use std::path::Path;

use async_trait::async_trait;
use image::imageops::FilterType;
use image::GenericImageView;
use tracing::debug;

use super::{ThumbnailError, ThumbnailProcessor};

/// Production [`ThumbnailProcessor`] using the `image` crate.
///
/// Decoding and re-encoding are CPU-bound, so the work runs on the blocking
/// thread pool.
#[derive(Debug, Default)]
pub struct ImageThumbnailProcessor;

impl ImageThumbnailProcessor {
    pub fn new() -> Self {
        Self
    }

    fn process_file(path: &Path, max_dimension: u32) -> Result<(), ThumbnailError> {
        let img = image::open(path).map_err(|e| ThumbnailError::DecodeFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let (width, height) = img.dimensions();
        let already_square = width == height;
        let already_small = width <= max_dimension && height <= max_dimension;
        let is_jpeg = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("jpg") | Some("jpeg")
        );
        if already_square && already_small && is_jpeg {
            debug!("thumbnail {} already compliant", path.display());
            return Ok(());
        }

        // Center crop to a square using the smaller dimension.
        let side = width.min(height);
        let x = (width - side) / 2;
        let y = (height - side) / 2;
        let mut img = img.crop_imm(x, y, side, side);

        if side > max_dimension {
            img = img.resize(max_dimension, max_dimension, FilterType::Lanczos3);
        }

        // Re-encode in place; format follows the existing extension so the
        // caller's path stays valid.
        img.save(path).map_err(|e| ThumbnailError::EncodeFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

#[async_trait]
impl ThumbnailProcessor for ImageThumbnailProcessor {
    async fn normalize(&self, path: &Path, max_dimension: u32) -> Result<(), ThumbnailError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::process_file(&path, max_dimension))
            .await
            .map_err(|e| ThumbnailError::Io(std::io::Error::other(e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn write_test_image(path: &Path, width: u32, height: u32) {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 0]));
        img.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_wide_image_becomes_square_and_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumb.jpg");
        write_test_image(&path, 640, 360);

        ImageThumbnailProcessor::new()
            .normalize(&path, 320)
            .await
            .unwrap();

        let processed = image::open(&path).unwrap();
        let (w, h) = processed.dimensions();
        assert_eq!(w, h);
        assert!(w <= 320);
    }

    #[tokio::test]
    async fn test_compliant_image_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumb.jpg");
        write_test_image(&path, 200, 200);
        let before = std::fs::metadata(&path).unwrap().len();

        ImageThumbnailProcessor::new()
            .normalize(&path, 320)
            .await
            .unwrap();

        let after = std::fs::metadata(&path).unwrap().len();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_small_non_square_is_cropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumb.png");
        write_test_image(&path, 100, 60);

        ImageThumbnailProcessor::new()
            .normalize(&path, 320)
            .await
            .unwrap();

        let processed = image::open(&path).unwrap();
        assert_eq!(processed.dimensions(), (60, 60));
    }

    #[tokio::test]
    async fn test_garbage_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumb.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let err = ImageThumbnailProcessor::new()
            .normalize(&path, 320)
            .await
            .unwrap_err();
        assert!(matches!(err, ThumbnailError::DecodeFailed { .. }));
    }
}
