use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{get_video_stats, FfmpegError};

#[derive(Debug, Deserialize, Serialize, Clone, Error)]
pub enum VideoInfoError {
    #[error("Error parsing stats: {0}")]
    JsonError(String),
    #[error("No video stream found")]
    NoVideoStream,
    #[error("Unable to determine the {0} of the video stream")]
    MissingField(String),
}

impl From<serde_json::Error> for VideoInfoError {
    fn from(e: serde_json::Error) -> Self {
        //limit maximum number of characters
        let error_string = format!("{e}").chars().take(500).collect::<String>();
        VideoInfoError::JsonError(error_string)
    }
}

// If the video metadata declares a rotation, ffmpeg autorotates every decoded frame, but
// ffprobe reports the "unrotated" resolution. We must therefore swap the x and y values
// if the rotation is 90 or 270
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
enum VideoRotation {
    #[default]
    Rot0,
    Rot90,
    Rot180,
    Rot270,
}

/// The properties of the first video stream of a file, as reported by ffprobe.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize, Default)]
pub struct VideoInfo {
    duration: Duration,
    frame_rate: f64,
    frame_count: u64,
    resolution: (u32, u32),
}

impl VideoInfo {
    /// Use ffprobe to get the frame rate, frame count, duration and resolution of a video.
    /// If the video contains multiple streams then only information about the first video
    /// stream will be returned.
    ///
    /// # Errors
    /// * The file cannot be read or is not recognized as a video by ffprobe
    /// * The output from ffprobe could not be parsed as JSON
    /// * The frame rate or frame count could not be determined
    pub fn new<P>(src_path: P) -> Result<Self, FfmpegError>
    where
        P: AsRef<Path>,
    {
        let stats_string = get_video_stats(&src_path)?;
        let info = Self::from_ffprobe_json(&stats_string)?;
        Ok(info)
    }

    /// Build a `VideoInfo` from the JSON printed by
    /// `ffprobe -show_format -show_streams -print_format json`.
    pub fn from_ffprobe_json(stats: &str) -> Result<Self, VideoInfoError> {
        let stats_parsed: Value = serde_json::from_str(stats)?;
        let video = first_video(&stats_parsed).ok_or(VideoInfoError::NoVideoStream)?;

        let frame_rate = first_success::<f64>(&[
            &|| parse_rate(&video["avg_frame_rate"]),
            &|| parse_rate(&video["r_frame_rate"]),
        ])
        .ok_or_else(|| VideoInfoError::MissingField("frame rate".to_string()))?;

        let container_duration = parse_secs(&stats_parsed["format"]["duration"]);
        let stream_duration = parse_secs(&video["duration"]);

        let frame_count = first_success::<u64>(&[
            &|| parse_count(&video["nb_frames"]),
            &|| stream_duration.map(|secs| (secs * frame_rate).round() as u64),
            &|| container_duration.map(|secs| (secs * frame_rate).round() as u64),
        ])
        .ok_or_else(|| VideoInfoError::MissingField("frame count".to_string()))?;

        let duration = container_duration
            .or(stream_duration)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or_default();

        let resolution = {
            let width = json_u32(&video["width"]).unwrap_or(0);
            let height = json_u32(&video["height"]).unwrap_or(0);

            match rotation(video) {
                VideoRotation::Rot0 | VideoRotation::Rot180 => (width, height),
                VideoRotation::Rot90 | VideoRotation::Rot270 => (height, width),
            }
        };

        Ok(VideoInfo {
            duration,
            frame_rate,
            frame_count,
            resolution,
        })
    }

    /// The duration of the container, as reported by ffprobe.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Frames per second of the first video stream.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Total number of frames in the first video stream.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The resolution of the video in pixels.
    /// Note the returned value is correct for the orientation that the video is intended
    /// to be viewed. (Ffprobe returns a surprising value by default if the video is stored rotated)
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }
}

/// Try each strategy in order and return the value from the first one that succeeds.
fn first_success<T>(strategies: &[&dyn Fn() -> Option<T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy())
}

fn first_video(stats_parsed: &Value) -> Option<&Value> {
    let Value::Array(streams) = &stats_parsed["streams"] else {
        return None;
    };

    streams
        .iter()
        .find(|s| matches!(&s["codec_type"], Value::String(codec_type) if codec_type == "video"))
}

// Rates are given as rationals like "30000/1001". "0/0" means unknown.
fn parse_rate(val: &Value) -> Option<f64> {
    let Value::String(text) = val else {
        return None;
    };

    let rate = match text.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => text.trim().parse::<f64>().ok()?,
    };

    (rate.is_finite() && rate > 0.0).then_some(rate)
}

fn parse_secs(val: &Value) -> Option<f64> {
    let secs = match val {
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };

    (secs.is_finite() && secs > 0.0).then_some(secs)
}

fn parse_count(val: &Value) -> Option<u64> {
    let count = match val {
        Value::String(text) => text.trim().parse::<u64>().ok()?,
        Value::Number(n) => n.as_u64()?,
        _ => return None,
    };

    (count > 0).then_some(count)
}

fn json_u32(val: &Value) -> Option<u32> {
    match val {
        Value::Number(v) => u32::try_from(v.as_u64()?).ok(),
        _ => None,
    }
}

fn rotation(video_stream: &Value) -> VideoRotation {
    //older ffprobe versions put the rotation in the tags, newer ones in the side data.
    let side_data_rotation = video_stream
        .get("side_data_list")
        .and_then(|list| list.get(0))
        .and_then(|entry| entry.get("rotation"));
    let tag_rotation = video_stream.get("tags").and_then(|tags| tags.get("rotate"));

    //if the rotation is found, it may either be a JSON String or JSON number, so unify
    //them here.
    let degrees = side_data_rotation
        .or(tag_rotation)
        .and_then(|rotation| match rotation {
            Value::Number(val) => val.as_i64(),
            Value::String(val) => val.trim().parse::<i64>().ok(),
            _ => None,
        });

    match degrees.map(|d| d.rem_euclid(360)) {
        Some(90) => VideoRotation::Rot90,
        Some(180) => VideoRotation::Rot180,
        Some(270) => VideoRotation::Rot270,
        _ => VideoRotation::Rot0,
    }
}
