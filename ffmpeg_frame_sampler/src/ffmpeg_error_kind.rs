use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::VideoInfoError;

/// Various causes of failure for ffmpeg/ffprobe functions.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FfmpegError {
    /// Ffmpeg/Ffprobe command was not found. Make sure Ffmpeg is installed and can be found on the command line.
    #[error("ffmpeg/ffprobe file not found. Make sure ffmpeg/ffprobe are installed and visible on the command line")]
    FfmpegNotFound,

    /// Io error occurred while executing Ffmpeg/Ffprobe command
    #[error("Ffmpeg IO error: {0}")]
    Io(String),

    /// Ffmpeg/Ffprobe returned a nonzero exit code. Because ffmpeg sometimes prints long error strings
    /// to stderr, The resulting string contains the first few hundred characters of the error message.
    #[error("Internal Ffmpeg Failure: {0}")]
    FfmpegInternal(String),

    /// Ffmpeg/Ffprobe did not finish within the allowed time and was killed.
    #[error("Ffmpeg did not finish within {0} seconds")]
    Timeout(u64),

    /// Failed to interpret Ffmpeg/Ffprobe output as a utf8-string.
    #[error("utf8 parsing/conversion failure")]
    Utf8Conversion,

    /// Either the X or Y dimension of the video was zero.
    /// Note: This sometimes occur when attempting to decode frames from an audio file.
    #[error("Video has an invalid resolution")]
    InvalidResolution,

    /// Ffmpeg produced fewer bytes than one full frame. Usually the requested
    /// timestamp lies past the last decodable frame.
    #[error("Ffmpeg returned a truncated frame: expected {expected} bytes, got {actual}")]
    ShortFrame { expected: usize, actual: usize },

    /// Failed to obtain video information.
    #[error("Failed to get video properties: {0}")]
    Info(#[from] VideoInfoError),
}
