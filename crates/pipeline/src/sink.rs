//! Frame asset persistence contract and the directory implementation.

use std::path::Path;

use image::RgbImage;
use thiserror::Error;

/// Errors raised while saving a frame asset. Frame-scoped: the pipeline
/// logs the failure and drops the frame without aborting the video.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SinkError {
    #[error("sink io failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode frame asset: {0}")]
    Encode(String),
}

/// Persists accepted frame images so the search results can link to them.
pub trait AssetSink {
    fn save(&self, frame: &RgbImage, path: &Path) -> Result<(), SinkError>;
}

/// Sink that writes frames as image files under a directory, inferring the
/// format from the file extension.
pub struct DirAssetSink;

impl DirAssetSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DirAssetSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetSink for DirAssetSink {
    fn save(&self, frame: &RgbImage, path: &Path) -> Result<(), SinkError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        frame
            .save(path)
            .map_err(|e| SinkError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    #[test]
    fn saves_frame_to_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4_frame_00000.jpg");

        let frame = RgbImage::from_pixel(8, 8, Rgb([120, 10, 200]));
        DirAssetSink::new().save(&frame, &path).unwrap();

        assert!(path.exists());
        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (8, 8));
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/frames/f.png");

        let frame = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        DirAssetSink::new().save(&frame, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unknown_extension_is_an_encode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("frame.unknownext");

        let frame = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        assert!(matches!(
            DirAssetSink::new().save(&frame, &path),
            Err(SinkError::Encode(_))
        ));
    }
}
