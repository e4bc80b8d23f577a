use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One contiguous period during which a slide was judged to be on screen.
///
/// Times are in seconds from the start of the video. The last interval of a timeline ends at
/// the duration of the video, because no later transition closed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionInterval {
    slide_index: usize,
    start_time: f64,
    end_time: f64,
    slide_path: PathBuf,
}

impl TransitionInterval {
    pub(crate) fn new(slide_index: usize, start_time: f64, end_time: f64, slide_path: PathBuf) -> Self {
        Self {
            slide_index,
            start_time,
            end_time: end_time.max(start_time),
            slide_path,
        }
    }

    /// Position of the slide in the deck, starting at 0.
    pub fn slide_index(&self) -> usize {
        self.slide_index
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// The reference image of the slide.
    pub fn slide_path(&self) -> &Path {
        &self.slide_path
    }
}

/// Counters describing how the sampled frames of a detection run were used.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SamplingStats {
    /// Frames that were decoded and fingerprinted.
    pub frames_sampled: u64,

    /// Frames that failed to decode and were passed over.
    pub frames_skipped: u64,

    /// Frames whose nearest reference slide was not within the match threshold.
    pub frames_unmatched: u64,

    /// Duration of the video in seconds (frame count divided by frame rate).
    pub video_duration: f64,
}

/// The result of a detection run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Timeline {
    intervals: Vec<TransitionInterval>,
    stats: SamplingStats,
}

impl Timeline {
    pub(crate) fn new(intervals: Vec<TransitionInterval>, stats: SamplingStats) -> Self {
        Self { intervals, stats }
    }

    /// Intervals in the order they were opened, which is ascending start time.
    pub fn intervals(&self) -> &[TransitionInterval] {
        &self.intervals
    }

    pub fn stats(&self) -> SamplingStats {
        self.stats
    }

    pub fn into_intervals(self) -> Vec<TransitionInterval> {
        self.intervals
    }

    /// The interval that covers `timestamp`, if a slide was on screen at that time.
    pub fn slide_at(&self, timestamp: f64) -> Option<&TransitionInterval> {
        self.intervals
            .iter()
            .rev()
            .find(|i| i.start_time <= timestamp && timestamp < i.end_time)
    }
}

// Bookkeeping for the intervals of a run. At most one interval is open at a time and it is
// always the last one.
#[derive(Debug)]
pub(crate) struct IntervalTracker {
    intervals: Vec<TransitionInterval>,
    video_duration: f64,
}

impl IntervalTracker {
    pub fn new(video_duration: f64) -> Self {
        Self {
            intervals: vec![],
            video_duration,
        }
    }

    pub fn current_slide(&self) -> Option<usize> {
        self.intervals.last().map(TransitionInterval::slide_index)
    }

    /// Record that `slide_index` is on screen at `timestamp`. Returns true if this started a
    /// new interval.
    pub fn observe(&mut self, slide_index: usize, timestamp: f64, slide_path: &Path) -> bool {
        if self.current_slide() == Some(slide_index) {
            return false;
        }

        if let Some(open) = self.intervals.last_mut() {
            open.end_time = timestamp.max(open.start_time);
        }

        self.intervals.push(TransitionInterval::new(
            slide_index,
            timestamp,
            self.video_duration,
            slide_path.to_path_buf(),
        ));

        true
    }

    pub fn finish(self) -> Vec<TransitionInterval> {
        self.intervals
    }
}
