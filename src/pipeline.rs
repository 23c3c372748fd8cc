use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::looper::{loop_audio, loop_video};
use crate::merge::merge_audio_video;
use crate::plan::{LoopPlan, check_crossfade, hours_to_seconds};
use crate::runner::ToolRunner;
use crate::upscale::{UpscaleReport, upscale_video};
use crate::{logi, logok, logw};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where in the job the frame upscaler runs, if at all.
///
/// Upscaling the short base clip is far cheaper than upscaling hours of
/// looped output, at the cost of the loop being built from upscaled frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpscaleMode {
    #[default]
    None,
    BeforeLoop,
    AfterMerge,
}

/// One long-form ambience render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbienceJob {
    pub base_video: PathBuf,
    #[serde(default)]
    pub base_audio: Option<PathBuf>,
    pub duration_hours: u32,
    pub output: PathBuf,
    #[serde(default)]
    pub upscale: UpscaleMode,
    /// Overrides the configured crossfade for this job.
    #[serde(default)]
    pub crossfade_seconds: Option<f64>,
}

impl AmbienceJob {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let job: AmbienceJob = serde_json::from_str(text)?;
        if job.duration_hours == 0 {
            anyhow::bail!("job.json: duration_hours must be at least 1");
        }
        if let Some(crossfade) = job.crossfade_seconds {
            check_crossfade(crossfade)
                .map_err(|e| anyhow::anyhow!("job.json: crossfade_seconds: {}", e))?;
        }
        Ok(job)
    }
}

#[derive(Debug, Clone)]
pub struct JobReport {
    pub output: PathBuf,
    pub video_plan: LoopPlan,
    pub audio_plan: Option<LoopPlan>,
    pub upscale: Option<UpscaleReport>,
}

/// Renders `job`: optional upscale, video loop, audio loop, merge.
///
/// Intermediates live in a job-scoped temp directory that is removed on
/// every exit path. Only `job.output` is left behind on success.
pub async fn run_job(
    runner: &dyn ToolRunner,
    cfg: &Config,
    job: &AmbienceJob,
) -> Result<JobReport> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("ambience-job-");
    let work = match &cfg.temp_dir {
        Some(dir) => builder.tempdir_in(dir),
        None => builder.tempdir(),
    }
    .map_err(|e| PipelineError::io(cfg.temp_dir.clone().unwrap_or_else(std::env::temp_dir), e))?;

    let result = run_job_in(runner, cfg, job, work.path()).await;

    let work_path = work.path().to_path_buf();
    if let Err(err) = work.close() {
        logw(format!(
            "Failed to remove job workspace {}: {}",
            work_path.display(),
            err
        ));
    }
    result
}

async fn run_job_in(
    runner: &dyn ToolRunner,
    cfg: &Config,
    job: &AmbienceJob,
    work: &Path,
) -> Result<JobReport> {
    let target_seconds = hours_to_seconds(job.duration_hours);
    let crossfade = job.crossfade_seconds.unwrap_or(cfg.crossfade_seconds);
    let mut upscale = None;

    let video_source = if job.upscale == UpscaleMode::BeforeLoop {
        let upscaled = work.join("base_upscaled.mp4");
        logi(format!("Upscaling base clip {}", job.base_video.display()));
        upscale = Some(upscale_video(runner, cfg, &job.base_video, &upscaled).await?);
        upscaled
    } else {
        job.base_video.clone()
    };

    let final_stage_output = if job.upscale == UpscaleMode::AfterMerge {
        work.join("merged.mp4")
    } else {
        job.output.clone()
    };

    let (video_plan, audio_plan) = match &job.base_audio {
        Some(base_audio) => {
            let looped_video = work.join("looped_video.mp4");
            let looped_audio = work.join("looped_audio.mp3");
            let video_plan =
                loop_video(runner, cfg, &video_source, &looped_video, job.duration_hours).await?;
            let audio_plan = loop_audio(
                runner,
                cfg,
                base_audio,
                &looped_audio,
                target_seconds,
                crossfade,
            )
            .await?;
            merge_audio_video(runner, cfg, &looped_video, &looped_audio, &final_stage_output)
                .await?;
            (video_plan, Some(audio_plan))
        }
        None => {
            let video_plan = loop_video(
                runner,
                cfg,
                &video_source,
                &final_stage_output,
                job.duration_hours,
            )
            .await?;
            (video_plan, None)
        }
    };

    if job.upscale == UpscaleMode::AfterMerge {
        logi(format!("Upscaling long-form render -> {}", job.output.display()));
        upscale = Some(upscale_video(runner, cfg, &final_stage_output, &job.output).await?);
    }

    logok(format!(
        "Ambience ready: {} ({}h, {} video loops)",
        job.output.display(),
        job.duration_hours,
        video_plan.loop_count
    ));

    Ok(JobReport {
        output: job.output.clone(),
        video_plan,
        audio_plan,
        upscale,
    })
}
