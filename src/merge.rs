use crate::config::Config;
use crate::error::Result;
use crate::ffmpeg;
use crate::looper::ensure_parent_dir;
use crate::runner::{ToolRunner, run_tool};
use crate::{logi, logok};
use std::path::Path;

/// Muxes the video stream of `video` with the audio stream of `audio`.
///
/// Video is stream-copied, audio is encoded to AAC, and the result stops at
/// the end of the shorter input.
pub async fn merge_audio_video(
    runner: &dyn ToolRunner,
    cfg: &Config,
    video: &Path,
    audio: &Path,
    output: &Path,
) -> Result<()> {
    ensure_parent_dir(output).await?;
    logi(format!(
        "Merging {} + {} -> {}",
        video.display(),
        audio.display(),
        output.display()
    ));

    let args = ffmpeg::merge_args(video, audio, output);
    run_tool(runner, &cfg.ffmpeg_path, &args, video).await?;

    logok(format!("Merged output written: {}", output.display()));
    Ok(())
}
