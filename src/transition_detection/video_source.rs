use image::RgbImage;

use super::{FrameDecodeError, SourceOpenError};

/// Something that can be opened to sample frames from a video. Opening is deferred until
/// detection actually starts, so a source can be constructed cheaply and reused.
pub trait VideoSource {
    type Reader: FrameReader;

    /// Acquire a reader over the video. The reader is released when it is dropped.
    ///
    /// # Errors
    /// Returns [`SourceOpenError`] if the video cannot be opened.
    fn open(&self) -> Result<Self::Reader, SourceOpenError>;
}

/// Random access to the decoded frames of one open video.
pub trait FrameReader {
    /// Frames per second. Detection rejects sources where this is not a positive finite number.
    fn frame_rate(&self) -> f64;

    /// Total number of frames in the video.
    fn frame_count(&self) -> u64;

    /// Seek to the frame at `frame_idx` and decode it.
    ///
    /// # Errors
    /// Returns [`FrameDecodeError`] if this particular frame cannot be decoded.
    fn read_frame(&mut self, frame_idx: u64) -> Result<RgbImage, FrameDecodeError>;
}

//Allow borrowed sources to be passed wherever an owned one is expected.
impl<T: VideoSource + ?Sized> VideoSource for &T {
    type Reader = T::Reader;

    fn open(&self) -> Result<Self::Reader, SourceOpenError> {
        (**self).open()
    }
}
