use crate::concat_list::ConcatList;
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::ffmpeg;
use crate::plan::{LoopPlan, hours_to_seconds};
use crate::probe::probe_duration;
use crate::runner::{ToolRunner, run_tool};
use crate::{logi, logok};
use std::path::Path;
use tokio::fs;

pub(crate) async fn ensure_parent_dir(out: &Path) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::io(parent, e))?;
        }
    }
    Ok(())
}

/// Repeats `input` end to end for `duration_hours` without re-encoding.
pub async fn loop_video(
    runner: &dyn ToolRunner,
    cfg: &Config,
    input: &Path,
    output: &Path,
    duration_hours: u32,
) -> Result<LoopPlan> {
    loop_video_seconds(runner, cfg, input, output, hours_to_seconds(duration_hours)).await
}

pub async fn loop_video_seconds(
    runner: &dyn ToolRunner,
    cfg: &Config,
    input: &Path,
    output: &Path,
    target_seconds: f64,
) -> Result<LoopPlan> {
    let base = probe_duration(runner, cfg, input).await?;
    let plan = LoopPlan::for_video(input, base, target_seconds)?;
    ensure_parent_dir(output).await?;

    if plan.is_trim_only() {
        logi(format!(
            "Trimming video {} ({:.2}s) to {}s -> {}",
            input.display(),
            base,
            ffmpeg::format_seconds(target_seconds),
            output.display()
        ));
        let args = ffmpeg::trim_copy_args(input, target_seconds, output);
        run_tool(runner, &cfg.ffmpeg_path, &args, input).await?;
        return Ok(plan);
    }

    logi(format!(
        "Looping video {} ({:.2}s) x{} -> {}s",
        input.display(),
        base,
        plan.loop_count,
        ffmpeg::format_seconds(target_seconds)
    ));

    let list = ConcatList::write(cfg, input, plan.loop_count)?;
    let args = ffmpeg::concat_copy_args(list.path(), target_seconds, output);
    let result = run_tool(runner, &cfg.ffmpeg_path, &args, input).await;
    list.release();
    result?;

    logok(format!("Looped video written: {}", output.display()));
    Ok(plan)
}

/// Repeats `input` with triangular crossfades at every seam, then trims to
/// `target_seconds`.
pub async fn loop_audio(
    runner: &dyn ToolRunner,
    cfg: &Config,
    input: &Path,
    output: &Path,
    target_seconds: f64,
    crossfade_seconds: f64,
) -> Result<LoopPlan> {
    let base = probe_duration(runner, cfg, input).await?;
    let plan = LoopPlan::for_audio(input, base, target_seconds, crossfade_seconds)?;
    ensure_parent_dir(output).await?;

    if plan.is_trim_only() {
        logi(format!(
            "Trimming audio {} ({:.2}s) to {}s -> {}",
            input.display(),
            base,
            ffmpeg::format_seconds(target_seconds),
            output.display()
        ));
        let args = ffmpeg::trim_copy_args(input, target_seconds, output);
        run_tool(runner, &cfg.ffmpeg_path, &args, input).await?;
        return Ok(plan);
    }

    logi(format!(
        "Looping audio {} ({:.2}s) x{} with {}s crossfades ({} stages) -> {}s",
        input.display(),
        base,
        plan.loop_count,
        ffmpeg::format_seconds(crossfade_seconds),
        plan.crossfade_stages(),
        ffmpeg::format_seconds(target_seconds)
    ));

    let args = ffmpeg::crossfade_loop_args(
        input,
        plan.loop_count,
        crossfade_seconds,
        target_seconds,
        output,
    );
    run_tool(runner, &cfg.ffmpeg_path, &args, input).await?;

    logok(format!("Looped audio written: {}", output.display()));
    Ok(plan)
}

/// [`loop_audio`] with the configured default crossfade.
pub async fn loop_audio_default(
    runner: &dyn ToolRunner,
    cfg: &Config,
    input: &Path,
    output: &Path,
    target_seconds: f64,
) -> Result<LoopPlan> {
    loop_audio(runner, cfg, input, output, target_seconds, cfg.crossfade_seconds).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::{FakeRunner, Invocation, fail, ok};
    use std::sync::{Arc, Mutex};

    fn cfg_in(dir: &Path) -> Config {
        Config {
            temp_dir: Some(dir.to_path_buf()),
            ..Config::default()
        }
    }

    fn entries_in(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    /// ffprobe answers `duration`; ffmpeg snapshots the concat list it was handed.
    fn video_runner(duration: &'static str, ffmpeg_fails: bool) -> (FakeRunner, Arc<Mutex<Option<String>>>) {
        let seen = Arc::new(Mutex::new(None));
        let seen_in = Arc::clone(&seen);
        let runner = FakeRunner::new(move |inv: &Invocation| {
            if inv.program == "ffprobe" {
                return ok(duration);
            }
            if inv.value_after("-f") == Some("concat") {
                let list = inv.value_after("-i").unwrap();
                *seen_in.lock().unwrap() = std::fs::read_to_string(list).ok();
            }
            if ffmpeg_fails {
                fail(1, "Conversion failed!")
            } else {
                ok("")
            }
        });
        (runner, seen)
    }

    #[tokio::test]
    async fn one_hour_from_sixty_seconds() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        std::fs::create_dir(&work).unwrap();
        let (runner, seen) = video_runner("60.0\n", false);

        let out = tmp.path().join("out/fireplace_1h.mp4");
        let plan = loop_video(&runner, &cfg_in(&work), Path::new("/base.mp4"), &out, 1)
            .await
            .unwrap();

        assert_eq!(plan.loop_count, 60);
        let ffmpeg = runner.calls_to("ffmpeg");
        assert_eq!(ffmpeg.len(), 1);
        assert_eq!(ffmpeg[0].value_after("-t"), Some("3600"));
        assert_eq!(ffmpeg[0].value_after("-c"), Some("copy"));
        assert_eq!(ffmpeg[0].last_arg(), out.display().to_string());

        let list = seen.lock().unwrap().clone().unwrap();
        assert_eq!(list.lines().count(), 60);
        assert!(list.lines().all(|l| l == "file '/base.mp4'"));

        assert_eq!(entries_in(&work), 0, "concat list left behind");
        assert!(out.parent().unwrap().is_dir());
    }

    #[tokio::test]
    async fn thirty_second_clip_needs_one_hundred_twenty_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let (runner, seen) = video_runner("30", false);
        loop_video(&runner, &cfg_in(tmp.path()), Path::new("/base.mp4"), &tmp.path().join("o.mp4"), 1)
            .await
            .unwrap();
        assert_eq!(seen.lock().unwrap().as_ref().unwrap().lines().count(), 120);
    }

    #[tokio::test]
    async fn two_hours_passes_7200_to_ffmpeg() {
        let tmp = tempfile::tempdir().unwrap();
        let (runner, _) = video_runner("60", false);
        loop_video(&runner, &cfg_in(tmp.path()), Path::new("/b.mp4"), &tmp.path().join("o.mp4"), 2)
            .await
            .unwrap();
        assert_eq!(runner.calls_to("ffmpeg")[0].value_after("-t"), Some("7200"));
    }

    #[tokio::test]
    async fn concat_list_is_removed_when_ffmpeg_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        std::fs::create_dir(&work).unwrap();
        let (runner, seen) = video_runner("60", true);

        let err = loop_video(&runner, &cfg_in(&work), Path::new("/b.mp4"), &tmp.path().join("o.mp4"), 1)
            .await
            .unwrap_err();

        match err {
            PipelineError::ToolFailed { tool, stderr, .. } => {
                assert_eq!(tool, "ffmpeg");
                assert_eq!(stderr, "Conversion failed!");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(seen.lock().unwrap().is_some());
        assert_eq!(entries_in(&work), 0);
    }

    #[tokio::test]
    async fn short_target_trims_without_concat() {
        let tmp = tempfile::tempdir().unwrap();
        let (runner, seen) = video_runner("60", false);
        let plan = loop_video_seconds(&runner, &cfg_in(tmp.path()), Path::new("/b.mp4"), &tmp.path().join("o.mp4"), 45.0)
            .await
            .unwrap();

        assert!(plan.is_trim_only());
        assert!(seen.lock().unwrap().is_none());
        let call = &runner.calls_to("ffmpeg")[0];
        assert_eq!(call.value_after("-f"), None);
        assert_eq!(call.value_after("-i"), Some("/b.mp4"));
        assert_eq!(call.value_after("-t"), Some("45"));
    }

    #[tokio::test]
    async fn zero_duration_source_never_reaches_ffmpeg() {
        let tmp = tempfile::tempdir().unwrap();
        let (runner, _) = video_runner("0.0", false);
        let err = loop_video(&runner, &cfg_in(tmp.path()), Path::new("/b.mp4"), &tmp.path().join("o.mp4"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSourceDuration { .. }));
        assert!(runner.calls_to("ffmpeg").is_empty());
    }

    #[tokio::test]
    async fn probe_errors_propagate_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let (runner, _) = video_runner("not_a_number", false);
        let err = loop_video(&runner, &cfg_in(tmp.path()), Path::new("/b.mp4"), &tmp.path().join("o.mp4"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDuration { .. }));
    }

    fn audio_runner(duration: &'static str) -> FakeRunner {
        FakeRunner::new(move |inv: &Invocation| {
            if inv.program == "ffprobe" { ok(duration) } else { ok("") }
        })
    }

    #[tokio::test]
    async fn two_hours_of_audio_from_a_125_second_clip() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = audio_runner("125.0");
        let out = tmp.path().join("audio/rain_2h.mp3");
        let plan = loop_audio(&runner, &Config::default(), Path::new("/rain.mp3"), &out, 7200.0, 3.0)
            .await
            .unwrap();

        assert_eq!(plan.effective_unit(), 122.0);
        assert_eq!(plan.loop_count, 61);

        let call = &runner.calls_to("ffmpeg")[0];
        assert_eq!(call.count("-i"), 61);
        let graph = call.value_after("-filter_complex").unwrap();
        assert_eq!(graph.matches("acrossfade=d=3:c1=tri:c2=tri").count(), 60);
        assert!(graph.ends_with("[out]"));
        assert_eq!(call.value_after("-map"), Some("[out]"));
        assert_eq!(call.value_after("-t"), Some("7200"));
    }

    #[tokio::test]
    async fn audio_shorter_target_is_a_plain_trim() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = audio_runner("125.0");
        let plan = loop_audio_default(&runner, &Config::default(), Path::new("/rain.mp3"), &tmp.path().join("o.mp3"), 90.0)
            .await
            .unwrap();

        assert_eq!(plan.crossfade_stages(), 0);
        let call = &runner.calls_to("ffmpeg")[0];
        assert_eq!(call.count("-i"), 1);
        assert_eq!(call.value_after("-filter_complex"), None);
        assert_eq!(call.value_after("-c"), Some("copy"));
        assert_eq!(call.value_after("-t"), Some("90"));
    }

    #[tokio::test]
    async fn crossfade_as_long_as_clip_fails_before_ffmpeg() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = audio_runner("3.0");
        let err = loop_audio(&runner, &Config::default(), Path::new("/blip.mp3"), &tmp.path().join("o.mp3"), 600.0, 3.0)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::CrossfadeExceedsDuration { .. }));
        assert!(runner.calls_to("ffmpeg").is_empty());
    }

    #[tokio::test]
    async fn zero_crossfade_fails_before_ffmpeg() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = audio_runner("10.0");
        let out = tmp.path().join("o.mp3");
        let err = loop_audio(&runner, &Config::default(), Path::new("/rain.mp3"), &out, 1000.0, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidCrossfade { .. }));
        assert!(runner.calls_to("ffmpeg").is_empty());
        assert!(!out.exists());
    }
}
