//! Frame acquisition contract and the image-sequence implementation.

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;
use tracing::debug;

/// Errors raised while opening or reading a frame source. Video-scoped:
/// the pipeline recovers by skipping the affected source.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SourceError {
    /// The source path could not be opened at all.
    #[error("failed to open source {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// The source reports a non-positive frame rate.
    #[error("source {path} reports invalid frame rate {fps}")]
    InvalidRate { path: PathBuf, fps: f64 },

    /// A frame inside the source could not be decoded.
    #[error("failed to decode frame {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// Produces the ordered (frame, timestamp) sequence for one video source.
///
/// Implementations sample at `target_fps`: consecutive returned timestamps
/// are at least `1 / target_fps` seconds apart. Timestamps are seconds
/// from the start of the source.
pub trait FrameSource {
    fn extract(
        &self,
        path: &Path,
        target_fps: f64,
    ) -> Result<Vec<(RgbImage, f64)>, SourceError>;
}

/// Frame source over a directory of pre-decoded frame images.
///
/// Raw video decoding lives outside the core; a decoder drops clips here
/// as directories of numbered images captured at a fixed native rate
/// (e.g. `clip.frames/00000.png`, `00001.png`, ...). Files are read in
/// name order and assigned timestamps `i / native_fps`, then sampled down
/// to the requested target rate.
pub struct ImageSequenceSource {
    native_fps: f64,
}

impl ImageSequenceSource {
    pub fn new(native_fps: f64) -> Self {
        Self { native_fps }
    }
}

impl FrameSource for ImageSequenceSource {
    fn extract(
        &self,
        path: &Path,
        target_fps: f64,
    ) -> Result<Vec<(RgbImage, f64)>, SourceError> {
        if self.native_fps <= 0.0 {
            return Err(SourceError::InvalidRate {
                path: path.to_path_buf(),
                fps: self.native_fps,
            });
        }
        if target_fps <= 0.0 {
            return Err(SourceError::InvalidRate {
                path: path.to_path_buf(),
                fps: target_fps,
            });
        }

        let entries = std::fs::read_dir(path).map_err(|e| SourceError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut frame_files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| is_frame_image(p))
            .collect();
        frame_files.sort();

        if frame_files.is_empty() {
            return Err(SourceError::Open {
                path: path.to_path_buf(),
                reason: "no frame images in sequence directory".to_string(),
            });
        }

        // Sample by timestamp: keep a frame once the clock reaches the next
        // capture point, then advance the capture point by one interval.
        let time_interval = 1.0 / target_fps;
        let mut next_capture_time = 0.0f64;
        let mut sampled = Vec::new();

        for (i, file) in frame_files.iter().enumerate() {
            let timestamp = i as f64 / self.native_fps;
            if timestamp < next_capture_time {
                continue;
            }

            let frame = image::open(file)
                .map_err(|e| SourceError::Decode {
                    path: file.clone(),
                    reason: e.to_string(),
                })?
                .to_rgb8();
            sampled.push((frame, timestamp));
            next_capture_time = timestamp + time_interval;
        }

        debug!(
            source = %path.display(),
            native = frame_files.len(),
            sampled = sampled.len(),
            "frames_sampled"
        );
        Ok(sampled)
    }
}

fn is_frame_image(path: &Path) -> bool {
    path.is_file()
        && matches!(
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_ascii_lowercase())
                .as_deref(),
            Some("png" | "jpg" | "jpeg" | "webp")
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    fn write_sequence(dir: &Path, count: usize) {
        for i in 0..count {
            let frame = RgbImage::from_pixel(4, 4, Rgb([i as u8, 0, 0]));
            frame.save(dir.join(format!("{i:05}.png"))).unwrap();
        }
    }

    #[test]
    fn samples_down_to_target_rate() {
        let dir = TempDir::new().unwrap();
        write_sequence(dir.path(), 30);

        let source = ImageSequenceSource::new(30.0);
        let frames = source.extract(dir.path(), 10.0).unwrap();

        // 30 native frames over one second at 10 fps: ten survive, spaced
        // at least 0.1 s apart.
        assert_eq!(frames.len(), 10);
        for pair in frames.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= 0.1 - 1e-9);
        }
        assert!((frames[0].1 - 0.0).abs() < 1e-9);
    }

    #[test]
    fn target_at_native_rate_keeps_every_frame() {
        let dir = TempDir::new().unwrap();
        write_sequence(dir.path(), 5);

        let source = ImageSequenceSource::new(10.0);
        let frames = source.extract(dir.path(), 10.0).unwrap();
        assert_eq!(frames.len(), 5);
    }

    #[test]
    fn missing_directory_is_an_open_error() {
        let source = ImageSequenceSource::new(30.0);
        let err = source
            .extract(Path::new("/nonexistent/clip.frames"), 10.0)
            .unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
    }

    #[test]
    fn empty_directory_is_an_open_error() {
        let dir = TempDir::new().unwrap();
        let source = ImageSequenceSource::new(30.0);
        let err = source.extract(dir.path(), 10.0).unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
    }

    #[test]
    fn non_positive_native_rate_rejected() {
        let dir = TempDir::new().unwrap();
        write_sequence(dir.path(), 3);

        let source = ImageSequenceSource::new(0.0);
        let err = source.extract(dir.path(), 10.0).unwrap_err();
        assert!(matches!(err, SourceError::InvalidRate { .. }));
    }

    #[test]
    fn frames_arrive_in_name_order() {
        let dir = TempDir::new().unwrap();
        write_sequence(dir.path(), 4);

        let source = ImageSequenceSource::new(10.0);
        let frames = source.extract(dir.path(), 10.0).unwrap();
        for (i, (frame, _)) in frames.iter().enumerate() {
            assert_eq!(frame.get_pixel(0, 0).0[0], i as u8);
        }
    }
}
