use std::path::PathBuf;

use slide_sync_lib::{manifest::ManifestError, DetectError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Slide detection failed: {0}")]
    Detect(#[from] DetectError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Manifest {} has {len} entries but entry {entry} was requested", .manifest.display())]
    NoSuchEntry {
        manifest: PathBuf,
        entry: usize,
        len: usize,
    },

    #[error("Manifest entry {entry} ({video_url}) lists no slides")]
    EmptyEntry { entry: usize, video_url: String },

    #[error("{0} slide images referenced by the manifest are missing")]
    MissingSlides(usize),

    #[error("ffmpeg and ffprobe must be installed and visible on the command line")]
    FfmpegNotFound,
}

pub fn print_error_and_quit(e: eyre::Report) -> ! {
    #[allow(clippy::print_stderr)]
    let () = eprintln!("{:?}", e);
    std::process::exit(1);
}
