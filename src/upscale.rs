use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::ffmpeg;
use crate::frames::{FRAME_FORMAT, FrameSequence, frame_pattern};
use crate::looper::ensure_parent_dir;
use crate::probe::{Framerate, probe_framerate};
use crate::runner::{ToolRunner, run_tool};
use crate::{logi, logok, logw};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;

#[derive(Debug, Clone, PartialEq)]
pub struct UpscaleReport {
    pub framerate: Framerate,
    pub frame_count: usize,
}

/// Decomposes `video` into `frames_dir/frame_%06d.jpg`.
pub async fn extract_frames(
    runner: &dyn ToolRunner,
    cfg: &Config,
    video: &Path,
    frames_dir: &Path,
) -> Result<FrameSequence> {
    fs::create_dir_all(frames_dir)
        .await
        .map_err(|e| PipelineError::io(frames_dir, e))?;

    let args = ffmpeg::extract_frames_args(video, &frame_pattern(frames_dir));
    run_tool(runner, &cfg.ffmpeg_path, &args, video).await?;

    FrameSequence::scan(frames_dir)
}

/// Runs the super-resolution tool over every frame in `input_dir`.
/// Output frames keep their input names.
pub async fn upscale_frames(
    runner: &dyn ToolRunner,
    cfg: &Config,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<FrameSequence> {
    fs::create_dir_all(output_dir)
        .await
        .map_err(|e| PipelineError::io(output_dir, e))?;

    let args = ffmpeg::upscale_frames_args(
        input_dir,
        output_dir,
        &cfg.upscale_model,
        cfg.upscale_scale,
        FRAME_FORMAT,
    );
    run_tool(runner, &cfg.upscaler_path, &args, input_dir).await?;

    FrameSequence::scan(output_dir)
}

/// Encodes the frames in `frames_dir` into `output` at `framerate`.
pub async fn frames_to_video(
    runner: &dyn ToolRunner,
    cfg: &Config,
    frames_dir: &Path,
    output: &Path,
    framerate: Framerate,
) -> Result<()> {
    ensure_parent_dir(output).await?;
    let args = ffmpeg::reassemble_args(
        &frame_pattern(frames_dir),
        framerate,
        cfg.reassembly_crf,
        output,
    );
    run_tool(runner, &cfg.ffmpeg_path, &args, frames_dir).await?;
    Ok(())
}

/// Scratch space for one upscale call: `frames/` and `frames_upscaled/`
/// under a fresh uniquely-named directory.
struct FrameWorkspace {
    root: TempDir,
}

impl FrameWorkspace {
    fn create(cfg: &Config) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("upscale-");
        let root = match &cfg.temp_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
        .map_err(|e| {
            PipelineError::io(cfg.temp_dir.clone().unwrap_or_else(std::env::temp_dir), e)
        })?;
        Ok(Self { root })
    }

    fn frames_dir(&self) -> PathBuf {
        self.root.path().join("frames")
    }

    fn upscaled_dir(&self) -> PathBuf {
        self.root.path().join("frames_upscaled")
    }

    fn release(self) {
        let path = self.root.path().to_path_buf();
        if let Err(err) = self.root.close() {
            logw(format!(
                "Failed to remove frame workspace {}: {}",
                path.display(),
                err
            ));
        }
    }
}

/// Upscales `input` into `output` frame by frame, keeping its frame rate.
///
/// Stages run strictly in order: probe, extract, upscale, reassemble. Both
/// frame directories are removed before returning, whether or not a stage
/// failed.
pub async fn upscale_video(
    runner: &dyn ToolRunner,
    cfg: &Config,
    input: &Path,
    output: &Path,
) -> Result<UpscaleReport> {
    let framerate = probe_framerate(runner, cfg, input).await?;
    let workspace = FrameWorkspace::create(cfg)?;

    let result = run_stages(runner, cfg, input, output, framerate, &workspace).await;
    workspace.release();
    let frame_count = result?;

    logok(format!(
        "Upscaled {} frames at {} fps -> {}",
        frame_count,
        framerate,
        output.display()
    ));
    Ok(UpscaleReport {
        framerate,
        frame_count,
    })
}

async fn run_stages(
    runner: &dyn ToolRunner,
    cfg: &Config,
    input: &Path,
    output: &Path,
    framerate: Framerate,
    workspace: &FrameWorkspace,
) -> Result<usize> {
    logi(format!("Extracting frames from {}", input.display()));
    let extracted = extract_frames(runner, cfg, input, &workspace.frames_dir()).await?;
    if extracted.is_empty() {
        return Err(PipelineError::NoFrames {
            dir: extracted.dir().to_path_buf(),
        });
    }

    logi(format!(
        "Upscaling {} frames (x{}, {})",
        extracted.count(),
        cfg.upscale_scale,
        cfg.upscale_model
    ));
    let upscaled = upscale_frames(runner, cfg, extracted.dir(), &workspace.upscaled_dir()).await?;
    if upscaled.count() != extracted.count() {
        return Err(PipelineError::FrameCountMismatch {
            stage: "upscale",
            expected: extracted.count(),
            actual: upscaled.count(),
        });
    }

    logi(format!(
        "Reassembling {} frames at {} -> {}",
        upscaled.count(),
        framerate,
        output.display()
    ));
    frames_to_video(runner, cfg, upscaled.dir(), output, framerate).await?;
    Ok(upscaled.count())
}
