pub mod detector;
#[cfg(feature = "ffmpeg_backend")]
pub mod ffmpeg_source;
pub(crate) mod reference_set;
pub mod timeline;
pub mod video_source;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::HashError;

/// A video could not be opened, or it was opened but reported metadata that cannot be sampled.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{0}")]
pub struct SourceOpenError(pub String);

/// A single frame could not be decoded. Detection skips the frame and carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{0}")]
pub struct FrameDecodeError(pub String);

/// Errors returned by slide transition detection. Every variant is fatal to the detection call
/// and no partial timeline is returned.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DetectError {
    /// The caller supplied parameters that detection cannot run with.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A reference slide could not be fingerprinted.
    #[error("Failed to build reference slide {index} ({}): {source}", .src_path.display())]
    ReferenceBuild {
        index: usize,
        src_path: PathBuf,
        #[source]
        source: HashError,
    },

    /// The video source could not be opened.
    #[error("Failed to open video source: {0}")]
    SourceOpen(#[from] SourceOpenError),

    /// A sampled frame fingerprint could not be compared with the reference set.
    #[error("Fingerprint comparison failed: {0}")]
    Hash(#[from] HashError),

    /// Detection was stopped through the cancel flag.
    #[error("Detection was cancelled")]
    Cancelled,
}
