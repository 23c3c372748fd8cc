use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::ffmpeg;
use crate::logw;
use crate::runner::{ToolRunner, launch};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Frame rate as ffprobe reports it, e.g. `30/1` or `24000/1001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framerate {
    pub num: u32,
    pub den: u32,
}

impl Framerate {
    /// Used when the source has no usable video stream.
    pub const DEFAULT: Framerate = Framerate { num: 30, den: 1 };

    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// Parses `num/den` (or a bare integer). Zero numerators or denominators
    /// are rejected since ffprobe uses `0/0` for "unknown".
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (num, den) = match text.split_once('/') {
            Some((n, d)) => (n.trim().parse::<u32>().ok()?, d.trim().parse::<u32>().ok()?),
            None => (text.parse::<u32>().ok()?, 1),
        };
        if num == 0 || den == 0 {
            return None;
        }
        Some(Self { num, den })
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl Default for Framerate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Framerate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[derive(Debug, Default, Deserialize)]
struct StreamListing {
    #[serde(default)]
    streams: Vec<StreamEntry>,
}

#[derive(Debug, Deserialize)]
struct StreamEntry {
    codec_type: Option<String>,
    r_frame_rate: Option<String>,
}

/// Duration of `media` in seconds, read from the container's `duration` field.
pub async fn probe_duration(runner: &dyn ToolRunner, cfg: &Config, media: &Path) -> Result<f64> {
    let args = ffmpeg::probe_duration_args(media);
    let output = launch(runner, &cfg.ffprobe_path, &args, media).await?;
    if !output.success {
        return Err(PipelineError::ProbeFailed {
            path: media.to_path_buf(),
            stderr: output.stderr.trim().to_string(),
        });
    }
    parse_duration_output(media, &output.stdout)
}

pub fn parse_duration_output(media: &Path, stdout: &str) -> Result<f64> {
    let text = stdout.trim();
    if text.is_empty() {
        return Err(PipelineError::EmptyOutput {
            path: media.to_path_buf(),
        });
    }
    match text.parse::<f64>() {
        Ok(duration) if duration.is_finite() => Ok(duration),
        _ => Err(PipelineError::InvalidDuration {
            path: media.to_path_buf(),
            output: text.to_string(),
        }),
    }
}

/// Frame rate of the first video stream of `media`.
///
/// Inputs without a readable video stream get [`Framerate::DEFAULT`] instead
/// of an error; only a failing ffprobe is reported.
pub async fn probe_framerate(
    runner: &dyn ToolRunner,
    cfg: &Config,
    media: &Path,
) -> Result<Framerate> {
    let args = ffmpeg::probe_streams_args(media);
    let output = launch(runner, &cfg.ffprobe_path, &args, media).await?;
    if !output.success {
        return Err(PipelineError::ProbeFailed {
            path: media.to_path_buf(),
            stderr: output.stderr.trim().to_string(),
        });
    }

    match parse_stream_framerate(&output.stdout) {
        Some(rate) => Ok(rate),
        None => {
            logw(format!(
                "No video frame rate found for {}; assuming {} fps",
                media.display(),
                Framerate::DEFAULT
            ));
            Ok(Framerate::DEFAULT)
        }
    }
}

pub async fn probe_fps(runner: &dyn ToolRunner, cfg: &Config, media: &Path) -> Result<f64> {
    Ok(probe_framerate(runner, cfg, media).await?.as_f64())
}

fn parse_stream_framerate(json: &str) -> Option<Framerate> {
    let listing: StreamListing = serde_json::from_str(json).ok()?;
    let video = listing
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))?;
    Framerate::parse(video.r_frame_rate.as_deref()?)
}
