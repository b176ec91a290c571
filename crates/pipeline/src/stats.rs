//! Ingestion statistics, per video and cumulative per run.

use serde::Serialize;

/// Counters for one processed video.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct VideoStats {
    /// Frames delivered by the source after sampling.
    pub frames_extracted: u64,
    /// Frames rejected by the duplicate detector.
    pub duplicates_detected: u64,
    /// Frames accepted and committed toward the store.
    pub frames_stored: u64,
    /// Frames dropped by frame-scoped failures (embedding, asset sink).
    pub frames_failed: u64,
}

/// Cumulative counters across a whole ingestion run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub frames_extracted: u64,
    pub duplicates_detected: u64,
    pub frames_stored: u64,
    pub frames_failed: u64,
    /// Videos fully processed (skipped and failed ones not included).
    pub videos_processed: u64,
}

impl RunStats {
    /// Fold one finished video's counters into the run totals.
    pub fn absorb(&mut self, video: &VideoStats) {
        self.frames_extracted += video.frames_extracted;
        self.duplicates_detected += video.duplicates_detected;
        self.frames_stored += video.frames_stored;
        self.frames_failed += video.frames_failed;
        self.videos_processed += 1;
    }
}
