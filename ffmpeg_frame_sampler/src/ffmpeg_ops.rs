use std::{
    ffi::{OsStr, OsString},
    io::prelude::*,
    path::Path,
    process::{Child, Command, Stdio},
    thread::JoinHandle,
    time::Duration,
};

#[cfg(target_family = "windows")]
use std::os::windows::process::CommandExt;

use image::RgbImage;
use wait_timeout::ChildExt;
use FfmpegCommandName::*;
use FfmpegError::*;

use crate::FfmpegError;

const FFPROBE_TIMEOUT_SECS: u64 = 60;
const FRAME_DECODE_TIMEOUT_SECS: u64 = 30;

/// Seek to `timestamp_secs` in the video at `src_path` and decode exactly one frame.
///
/// `resolution` must be the display resolution of the video (see [`crate::VideoInfo::resolution`]),
/// because ffmpeg writes raw rgb24 bytes without any header.
///
/// # Errors
/// * ffmpeg is not installed, fails, or does not finish within a timeout
/// * ffmpeg produced less than one full frame (e.g. the timestamp is past the end of the video)
pub fn extract_frame_rgb(
    src_path: impl AsRef<Path>,
    timestamp_secs: f64,
    resolution: (u32, u32),
) -> Result<RgbImage, FfmpegError> {
    let (x, y) = resolution;
    if x == 0 || y == 0 {
        return Err(InvalidResolution);
    }

    let frame_size = usize::try_from(x)
        .ok()
        .and_then(|x| x.checked_mul(usize::try_from(y).ok()?))
        .and_then(|pixels| pixels.checked_mul(3))
        .ok_or(InvalidResolution)?;

    // Input seeking (-ss before -i) is frame accurate when transcoding.
    let seek_arg = OsString::from(format!("{:.6}", timestamp_secs.max(0.0)));

    #[rustfmt::skip]
    let args = [
        OsStr::new("-hide_banner"),
        OsStr::new("-loglevel"), OsStr::new("error"),
        OsStr::new("-nostats"),
        OsStr::new("-threads"),  OsStr::new("1"),
        OsStr::new("-ss"),       seek_arg.as_os_str(),
        OsStr::new("-i"),        src_path.as_ref().as_os_str(),
        OsStr::new("-frames:v"), OsStr::new("1"),
        OsStr::new("-an"),
        OsStr::new("-pix_fmt"),  OsStr::new("rgb24"),
        OsStr::new("-c:v"),      OsStr::new("rawvideo"),
        OsStr::new("-f"),        OsStr::new("rawvideo"),
        OsStr::new("-"),
    ];

    let mut raw_buf = run_ffmpeg_command(Ffmpeg, &args, FRAME_DECODE_TIMEOUT_SECS)?.stdout;

    if raw_buf.len() < frame_size {
        return Err(ShortFrame {
            expected: frame_size,
            actual: raw_buf.len(),
        });
    }
    raw_buf.truncate(frame_size);

    RgbImage::from_raw(x, y, raw_buf).ok_or(ShortFrame {
        expected: frame_size,
        actual: 0,
    })
}

pub fn get_video_stats<P: AsRef<Path>>(src_path: P) -> Result<String, FfmpegError> {
    #[rustfmt::skip]
    let args = [
        OsStr::new("-v"),            OsStr::new("quiet"),
        OsStr::new("-show_format"),
        OsStr::new("-show_streams"),
        OsStr::new("-print_format"), OsStr::new("json"),
        src_path.as_ref().as_os_str(),
    ];

    let stdout = run_ffmpeg_command(Ffprobe, &args, FFPROBE_TIMEOUT_SECS)?.stdout;

    String::from_utf8(stdout).map_err(|_| Utf8Conversion)
}

pub fn ffmpeg_and_ffprobe_are_callable() -> bool {
    //check ffprobe is callable.
    if run_ffmpeg_command(Ffprobe, &[OsStr::new("-version")], FFPROBE_TIMEOUT_SECS).is_err() {
        return false;
    }

    //now ffmpeg.
    if run_ffmpeg_command(Ffmpeg, &[OsStr::new("-version")], FFPROBE_TIMEOUT_SECS).is_err() {
        return false;
    }

    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FfmpegCommandName {
    Ffprobe,
    Ffmpeg,
}

impl FfmpegCommandName {
    pub fn as_os_str(&self) -> &'static OsStr {
        match self {
            Self::Ffprobe => OsStr::new("ffprobe"),
            Self::Ffmpeg => OsStr::new("ffmpeg"),
        }
    }
}

fn spawn_ffmpeg_command(name: FfmpegCommandName, args: &[&OsStr]) -> Result<Child, FfmpegError> {
    let mut command = Command::new(name.as_os_str());
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    //do not spawn a command window on windows when when in a gui application
    #[cfg(target_family = "windows")]
    command.creation_flags(winapi::um::winbase::CREATE_NO_WINDOW);

    command.spawn().map_err(|e| match e.kind() {
        //shell failed to execute the command. Separate out FileNotFound from all other errors
        //as by far the most likely cause is ffmpeg is not installed.
        std::io::ErrorKind::NotFound => FfmpegNotFound,
        _ => Io(format!("{:?}", e.kind())),
    })
}

struct FfmpegOutput {
    stdout: Vec<u8>,
}

type FfmpegCmdResult = Result<FfmpegOutput, FfmpegError>;

// Drain a pipe on its own thread so that a full stderr pipe can never block
// ffmpeg while we are waiting on stdout (or vice versa).
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut acc = vec![];
        if let Some(mut pipe) = pipe {
            let _read_error = pipe.read_to_end(&mut acc);
        }
        acc
    })
}

fn run_ffmpeg_command(
    name: FfmpegCommandName,
    args: &[&OsStr],
    timeout_secs: u64,
) -> FfmpegCmdResult {
    fn truncate_ffmpeg_err_msg(stderr: &[u8]) -> FfmpegError {
        match std::str::from_utf8(stderr) {
            Ok(error_text) => FfmpegInternal(error_text.chars().take(500).collect::<String>()),
            Err(_) => Utf8Conversion,
        }
    }

    let mut child = spawn_ffmpeg_command(name, args)?;

    let stdout_thread = drain(child.stdout.take());
    let stderr_thread = drain(child.stderr.take());

    let wait_result = child.wait_timeout(Duration::from_secs(timeout_secs));

    let status = match wait_result {
        Ok(Some(status)) => status,
        Ok(None) => {
            // to prevent accumulation of zombie processes, reap the killed child here.
            let _kill_error = child.kill();
            let _wait_error = child.wait();
            return Err(Timeout(timeout_secs));
        }
        Err(e) => {
            let _kill_error = child.kill();
            let _wait_error = child.wait();
            return Err(Io(format!("{:?}", e.kind())));
        }
    };

    let stdout = stdout_thread
        .join()
        .map_err(|_| Io("stdout reader thread panicked".to_string()))?;
    let stderr = stderr_thread
        .join()
        .map_err(|_| Io("stderr reader thread panicked".to_string()))?;

    //The shell successfully executed it, but maybe it returned an error code
    if status.success() {
        Ok(FfmpegOutput { stdout })
    } else {
        //sometimes ffmpeg creates very long error messages. Limit them to the first 500 characters
        Err(truncate_ffmpeg_err_msg(&stderr))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_zero_resolution_is_rejected_before_spawning() {
        let res = extract_frame_rgb("does/not/matter.mp4", 0.0, (0, 360));
        assert!(matches!(res, Err(InvalidResolution)));
    }
}
