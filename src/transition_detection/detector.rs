use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{
    reference_set::{build_reference_set, nearest, ReferenceSlide},
    timeline::{IntervalTracker, SamplingStats, Timeline, TransitionInterval},
    video_source::{FrameReader, VideoSource},
    DetectError, SourceOpenError,
};
use crate::{
    definitions::{DEFAULT_MATCH_THRESHOLD, DEFAULT_SAMPLE_INTERVAL_SECS},
    Fingerprint, FingerprintBuilder, HashOptions,
};

/// Options for a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectOptions {
    /// Time between sampled frames, in seconds. Must be positive.
    pub sample_interval_secs: f64,

    /// A sampled frame shows a slide only if their fingerprints are strictly closer than this.
    /// Must be no greater than the fingerprint bit length.
    pub match_threshold: u32,

    pub hash_options: HashOptions,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            sample_interval_secs: DEFAULT_SAMPLE_INTERVAL_SECS,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            hash_options: HashOptions::default(),
        }
    }
}

impl DetectOptions {
    fn validate(&self) -> Result<(), DetectError> {
        if !(self.sample_interval_secs.is_finite() && self.sample_interval_secs > 0.0) {
            return Err(DetectError::InvalidArgument(format!(
                "sample interval must be a positive number of seconds, got {}",
                self.sample_interval_secs
            )));
        }

        if !self.hash_options.is_valid() {
            return Err(DetectError::InvalidArgument(format!(
                "hash size and high frequency factor must be nonzero and their product at most {}, got {:?}",
                crate::MAX_RESIZE_DIM,
                self.hash_options
            )));
        }

        let bit_len = self.hash_options.bit_len();
        if self.match_threshold as usize > bit_len {
            return Err(DetectError::InvalidArgument(format!(
                "match threshold {} is larger than the fingerprint length of {bit_len} bits",
                self.match_threshold
            )));
        }

        Ok(())
    }
}

// A decoded frame, reduced to what the match decision needs.
struct SampledFrame {
    timestamp: f64,
    fingerprint: Fingerprint,
}

/// Finds which slide of a deck is on screen at each point of a video.
///
/// The detector owns no video state. Every call to [`TransitionDetector::detect`] opens the
/// source, samples it from start to end, and releases it again before returning.
#[derive(Debug, Clone, Default)]
pub struct TransitionDetector {
    options: DetectOptions,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl TransitionDetector {
    #[must_use]
    pub fn from_options(options: DetectOptions) -> Self {
        Self {
            options,
            cancel_flag: None,
        }
    }

    /// Stop detection with [`DetectError::Cancelled`] when `flag` is set. The flag is checked
    /// once per sampled frame, so a frame decode already in progress is not interrupted.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn options(&self) -> &DetectOptions {
        &self.options
    }

    /// Align `source` against the ordered deck of slide images in `slides`.
    ///
    /// # Errors
    /// * [`DetectError::InvalidArgument`] if `slides` is empty or the options are out of range
    /// * [`DetectError::ReferenceBuild`] if any slide image cannot be fingerprinted
    /// * [`DetectError::SourceOpen`] if the video cannot be opened or has an invalid frame rate
    /// * [`DetectError::Cancelled`] if the cancel flag was raised
    pub fn detect<S, P>(&self, source: &S, slides: &[P]) -> Result<Timeline, DetectError>
    where
        S: VideoSource + ?Sized,
        P: AsRef<Path> + Sync,
    {
        if slides.is_empty() {
            return Err(DetectError::InvalidArgument(
                "at least one slide image is required".to_string(),
            ));
        }
        self.options.validate()?;

        let builder = FingerprintBuilder::from_options(self.options.hash_options);
        let refs = build_reference_set(&builder, slides)?;

        let mut reader = source.open()?;
        let timeline = self.sample_video(&builder, &refs, &mut reader)?;

        let stats = timeline.stats();
        info!(
            target: "transition_detection",
            "Found {} intervals in {:.1}s of video ({} frames sampled, {} skipped, {} unmatched)",
            timeline.intervals().len(),
            stats.video_duration,
            stats.frames_sampled,
            stats.frames_skipped,
            stats.frames_unmatched,
        );

        Ok(timeline)
    }

    fn sample_video<R: FrameReader>(
        &self,
        builder: &FingerprintBuilder,
        refs: &[ReferenceSlide],
        reader: &mut R,
    ) -> Result<Timeline, DetectError> {
        let frame_rate = reader.frame_rate();
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(SourceOpenError(format!("invalid frame rate: {frame_rate}")).into());
        }

        let frame_count = reader.frame_count();
        let video_duration = frame_count as f64 / frame_rate;
        let stride = sampling_stride(frame_rate, self.options.sample_interval_secs);
        debug!("Sampling {frame_count} frames at {frame_rate:.3} fps, every {stride} frames");

        let mut tracker = IntervalTracker::new(video_duration);
        let mut stats = SamplingStats {
            video_duration,
            ..SamplingStats::default()
        };

        let mut frame_idx = 0;
        while frame_idx < frame_count {
            if self.is_cancelled() {
                debug!("Cancelled at frame {frame_idx}");
                return Err(DetectError::Cancelled);
            }

            let sample = match Self::sample_frame(builder, reader, frame_idx, frame_rate) {
                Ok(sample) => sample,
                Err(e) => {
                    warn!("Skipping frame {frame_idx}: {e}");
                    stats.frames_skipped += 1;
                    frame_idx = frame_idx.saturating_add(stride);
                    continue;
                }
            };
            stats.frames_sampled += 1;

            match nearest(refs, &sample.fingerprint)? {
                Some((slide, dist)) if dist < self.options.match_threshold => {
                    if tracker.observe(slide.index, sample.timestamp, &slide.src_path) {
                        debug!(
                            "Slide {} on screen from {:.3}s (distance {dist})",
                            slide.index, sample.timestamp
                        );
                    }
                }
                _ => stats.frames_unmatched += 1,
            }

            frame_idx = frame_idx.saturating_add(stride);
        }

        Ok(Timeline::new(tracker.finish(), stats))
    }

    fn sample_frame<R: FrameReader>(
        builder: &FingerprintBuilder,
        reader: &mut R,
        frame_idx: u64,
        frame_rate: f64,
    ) -> Result<SampledFrame, String> {
        let frame = reader.read_frame(frame_idx).map_err(|e| e.to_string())?;
        let fingerprint = builder.fingerprint_rgb(frame).map_err(|e| e.to_string())?;

        Ok(SampledFrame {
            timestamp: frame_idx as f64 / frame_rate,
            fingerprint,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}

/// Align `source` against the ordered deck `slides` with default hashing options, returning the
/// intervals during which each slide is on screen.
///
/// # Errors
/// See [`TransitionDetector::detect`].
pub fn detect<S, P>(
    source: &S,
    slides: &[P],
    sample_interval_secs: f64,
    match_threshold: u32,
) -> Result<Vec<TransitionInterval>, DetectError>
where
    S: VideoSource + ?Sized,
    P: AsRef<Path> + Sync,
{
    let options = DetectOptions {
        sample_interval_secs,
        match_threshold,
        ..DetectOptions::default()
    };

    TransitionDetector::from_options(options)
        .detect(source, slides)
        .map(Timeline::into_intervals)
}

fn sampling_stride(frame_rate: f64, sample_interval_secs: f64) -> u64 {
    let stride = (frame_rate * sample_interval_secs).round();
    if stride >= 1.0 {
        stride as u64
    } else {
        1
    }
}
