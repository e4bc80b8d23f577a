#![allow(clippy::let_and_return)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::unwrap_used)]

//! Helpers for sampling individual frames out of a video file by calling
//! `ffprobe` and `ffmpeg` on the command line.
//!
//! [`VideoInfo`] describes a video (frame rate, frame count, duration and
//! display resolution), and [`extract_frame_rgb`] seeks to a timestamp and
//! decodes exactly one frame as an [`image::RgbImage`].
//!
//! Ffmpeg and Ffprobe must be installed and visible on the command line.

mod ffmpeg_error_kind;
mod ffmpeg_ops;
mod video_info;

pub use ffmpeg_error_kind::FfmpegError;
pub use ffmpeg_ops::{extract_frame_rgb, ffmpeg_and_ffprobe_are_callable, get_video_stats};
pub use video_info::{VideoInfo, VideoInfoError};
