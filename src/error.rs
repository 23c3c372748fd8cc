use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the looping, merging and upscaling pipeline.
///
/// Probe errors and planning errors are raised before any output is written.
/// Execution errors carry the diagnostic text the external tool printed.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("ffprobe failed for {}: {stderr}", .path.display())]
    ProbeFailed { path: PathBuf, stderr: String },

    #[error("ffprobe returned empty output for {}", .path.display())]
    EmptyOutput { path: PathBuf },

    #[error("ffprobe returned invalid duration '{output}' for {}", .path.display())]
    InvalidDuration { path: PathBuf, output: String },

    #[error("source duration {duration}s of {} is not usable for looping", .path.display())]
    InvalidSourceDuration { path: PathBuf, duration: f64 },

    #[error(
        "crossfade of {crossfade}s is not shorter than the {duration}s source {}",
        .path.display()
    )]
    CrossfadeExceedsDuration {
        path: PathBuf,
        crossfade: f64,
        duration: f64,
    },

    #[error("invalid target duration {target}s")]
    InvalidTargetDuration { target: f64 },

    #[error("invalid crossfade duration {crossfade}s")]
    InvalidCrossfade { crossfade: f64 },

    #[error("{tool} failed for {} ({status}): {stderr}", .path.display())]
    ToolFailed {
        tool: String,
        path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("failed to launch {tool} for {}: {source}", .path.display())]
    Spawn {
        tool: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("frame count mismatch after {stage}: expected {expected}, found {actual}")]
    FrameCountMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("frame sequence in {} is missing frame {missing}", .dir.display())]
    BrokenFrameSequence { dir: PathBuf, missing: usize },

    #[error("no frames found in {}", .dir.display())]
    NoFrames { dir: PathBuf },

    #[error("failed to compile frame name pattern: {0}")]
    FramePattern(#[from] regex::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
