#![allow(clippy::let_and_return)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::unwrap_used)]

//! # Overview
//! slide_sync_lib finds which slide of a presentation deck is on screen at each point of a
//! presentation video.
//!
//! # How it works
//! Every slide image is reduced to a 64 bit perceptual fingerprint: the image is shrunk to a
//! small grayscale square and the signs of its lowest
//! [discrete cosine transform](http://hackerfactor.com/blog/index.php%3F/archives/432-Looks-Like-It.html)
//! frequencies become the bits. The video is then sampled at a fixed interval, each sampled
//! frame is fingerprinted the same way, and the frame is matched against the slide whose
//! fingerprint differs from it in the fewest bits. A frame only counts as showing a slide when
//! fewer than `match_threshold` bits differ.
//!
//! Fingerprints survive scaling and heavy compression, so a low resolution recording still
//! matches the high resolution slide images it was made from.
//!
//! # High Level API
//! ```rust,no_run
//! use slide_sync_lib::{detect, FfmpegVideoSource};
//!
//! let video = FfmpegVideoSource::new("lecture.mp4");
//! let slides = ["deck/slide_1.png", "deck/slide_2.png", "deck/slide_3.png"];
//!
//! let intervals = detect(&video, &slides, 1.0, 15).unwrap();
//! for interval in intervals {
//!     println!(
//!         "slide {} from {:.1}s to {:.1}s",
//!         interval.slide_index(),
//!         interval.start_time(),
//!         interval.end_time()
//!     );
//! }
//! ```
//!
//! For more control (hash size, cancellation, sampling statistics) use
//! [`TransitionDetector`] with [`DetectOptions`].
//!
//! # Limitations
//! Transitions are only located to within one sampling interval. Slides are accepted in any
//! order, so a deck containing near identical slides may produce spurious short intervals
//! when the video flickers between them. A slide shown twice produces two separate intervals.
//!
//! # Prerequisites
//! With the default `ffmpeg_backend` feature this crate calls Ffmpeg from the command line.
//! You must make Ffmpeg and Ffprobe available on the command line, for example:
//!
//! * Debian-based systems: ```# apt-get install ffmpeg```
//! * Yum-based systems: ```# yum install ffmpeg```
//! * Windows:
//!     1) Download the correct installer from <https://ffmpeg.org/download.html>
//!     2) Run the installer and install ffmpeg to any directory
//!     3) Add the directory into the PATH environment variable
//!
//! Any other decoder can be used by implementing [`VideoSource`] and [`FrameReader`].

pub(crate) mod definitions;
pub mod manifest;
pub(crate) mod slide_hashing;
pub(crate) mod transition_detection;

pub use definitions::{
    DEFAULT_HASH_SIZE, DEFAULT_HIGHFREQ_FACTOR, DEFAULT_MATCH_THRESHOLD, DEFAULT_SAMPLE_INTERVAL_SECS,
    MAX_RESIZE_DIM,
};
pub use slide_hashing::{
    fingerprint::Fingerprint,
    fingerprint_builder::{FingerprintBuilder, HashOptions},
    HashError,
};
pub use transition_detection::{
    detector::{detect, DetectOptions, TransitionDetector},
    timeline::{SamplingStats, Timeline, TransitionInterval},
    video_source::{FrameReader, VideoSource},
    DetectError, FrameDecodeError, SourceOpenError,
};

#[cfg(feature = "ffmpeg_backend")]
pub use transition_detection::ffmpeg_source::{FfmpegFrameReader, FfmpegVideoSource};

/// Returns true if ffmpeg and ffprobe can both be run from the command line.
#[cfg(feature = "ffmpeg_backend")]
pub fn ffmpeg_is_available() -> bool {
    ffmpeg_frame_sampler::ffmpeg_and_ffprobe_are_callable()
}
