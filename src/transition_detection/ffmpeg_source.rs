use std::path::{Path, PathBuf};

use ffmpeg_frame_sampler::{extract_frame_rgb, VideoInfo};
use image::RgbImage;
use log::debug;

use super::{
    video_source::{FrameReader, VideoSource},
    FrameDecodeError, SourceOpenError,
};

/// A video file on the local filesystem, sampled by calling ffmpeg on the command line.
///
/// Ffmpeg and Ffprobe must be installed and visible on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegVideoSource {
    src_path: PathBuf,
}

impl FfmpegVideoSource {
    pub fn new(src_path: impl AsRef<Path>) -> Self {
        Self {
            src_path: src_path.as_ref().to_path_buf(),
        }
    }

    pub fn src_path(&self) -> &Path {
        &self.src_path
    }
}

impl VideoSource for FfmpegVideoSource {
    type Reader = FfmpegFrameReader;

    fn open(&self) -> Result<Self::Reader, SourceOpenError> {
        let src_path = &self.src_path;

        //ffprobe gives a confusing message for missing files, so check first.
        if !src_path.is_file() {
            return Err(SourceOpenError(format!("{}: no such file", src_path.display())));
        }

        let info = VideoInfo::new(src_path)
            .map_err(|e| SourceOpenError(format!("{}: {e}", src_path.display())))?;

        let (x, y) = info.resolution();
        if x == 0 || y == 0 {
            return Err(SourceOpenError(format!(
                "{}: invalid resolution {x}x{y}",
                src_path.display()
            )));
        }

        debug!(
            "Opened {}: {:.3} fps, {} frames, {}x{}",
            src_path.display(),
            info.frame_rate(),
            info.frame_count(),
            x,
            y
        );

        Ok(FfmpegFrameReader {
            src_path: src_path.clone(),
            info,
        })
    }
}

/// An open [`FfmpegVideoSource`]. Each frame is decoded by a separate short-lived ffmpeg process,
/// so no process outlives a call to [`FrameReader::read_frame`].
#[derive(Debug)]
pub struct FfmpegFrameReader {
    src_path: PathBuf,
    info: VideoInfo,
}

impl FrameReader for FfmpegFrameReader {
    fn frame_rate(&self) -> f64 {
        self.info.frame_rate()
    }

    fn frame_count(&self) -> u64 {
        self.info.frame_count()
    }

    fn read_frame(&mut self, frame_idx: u64) -> Result<RgbImage, FrameDecodeError> {
        let timestamp = frame_idx as f64 / self.info.frame_rate();

        extract_frame_rgb(&self.src_path, timestamp, self.info.resolution())
            .map_err(|e| FrameDecodeError(format!("frame {frame_idx} at {timestamp:.3}s: {e}")))
    }
}

impl Drop for FfmpegFrameReader {
    fn drop(&mut self) {
        debug!("Released {}", self.src_path.display());
    }
}
