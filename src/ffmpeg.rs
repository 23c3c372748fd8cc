//! Argument vectors for every external tool invocation.
//!
//! Builders are pure so the exact command lines can be checked without the
//! tools installed. The program name is supplied by the caller from config.

use crate::probe::Framerate;
use std::path::Path;

/// Label bound to the last crossfade stage and consumed by `-map`.
pub const CROSSFADE_OUTPUT_LABEL: &str = "out";

const REASSEMBLY_CODEC: &str = "libx264";
const REASSEMBLY_PIX_FMT: &str = "yuv420p";
const LOOPED_AUDIO_CODEC: &str = "libmp3lame";
const LOOPED_AUDIO_QUALITY: &str = "2";
const MERGED_AUDIO_CODEC: &str = "aac";

/// Seconds as ffmpeg expects them: `7200`, `12.5`.
pub fn format_seconds(seconds: f64) -> String {
    format!("{}", seconds)
}

fn ffmpeg_prelude() -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
    ]
}

pub fn probe_duration_args(media: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        media.display().to_string(),
    ]
}

pub fn probe_streams_args(media: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "stream=codec_type,r_frame_rate".to_string(),
        "-of".to_string(),
        "json".to_string(),
        media.display().to_string(),
    ]
}

pub fn concat_copy_args(list_txt: &Path, target_seconds: f64, out: &Path) -> Vec<String> {
    let mut args = ffmpeg_prelude();
    args.extend([
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        list_txt.display().to_string(),
        "-t".to_string(),
        format_seconds(target_seconds),
        "-c".to_string(),
        "copy".to_string(),
        out.display().to_string(),
    ]);
    args
}

pub fn trim_copy_args(input: &Path, target_seconds: f64, out: &Path) -> Vec<String> {
    let mut args = ffmpeg_prelude();
    args.extend([
        "-i".to_string(),
        input.display().to_string(),
        "-t".to_string(),
        format_seconds(target_seconds),
        "-c".to_string(),
        "copy".to_string(),
        out.display().to_string(),
    ]);
    args
}

/// Chains `inputs` audio inputs pairwise: `[0:a][1:a]` feed stage `a1`, `[a1][2:a]`
/// feed `a2`, and so on until the final stage writes the reserved output label.
pub fn crossfade_filter_graph(inputs: usize, crossfade_seconds: f64) -> String {
    let mut stages = Vec::with_capacity(inputs.saturating_sub(1));
    let mut current = "[0:a]".to_string();

    for i in 1..inputs {
        let label = if i < inputs - 1 {
            format!("[a{}]", i)
        } else {
            format!("[{}]", CROSSFADE_OUTPUT_LABEL)
        };
        stages.push(format!(
            "{}[{}:a]acrossfade=d={}:c1=tri:c2=tri{}",
            current,
            i,
            format_seconds(crossfade_seconds),
            label
        ));
        current = label;
    }

    stages.join(";")
}

pub fn crossfade_loop_args(
    input: &Path,
    loop_count: usize,
    crossfade_seconds: f64,
    target_seconds: f64,
    out: &Path,
) -> Vec<String> {
    let mut args = ffmpeg_prelude();
    for _ in 0..loop_count {
        args.push("-i".to_string());
        args.push(input.display().to_string());
    }
    args.extend([
        "-filter_complex".to_string(),
        crossfade_filter_graph(loop_count, crossfade_seconds),
        "-map".to_string(),
        format!("[{}]", CROSSFADE_OUTPUT_LABEL),
        "-t".to_string(),
        format_seconds(target_seconds),
        "-c:a".to_string(),
        LOOPED_AUDIO_CODEC.to_string(),
        "-q:a".to_string(),
        LOOPED_AUDIO_QUALITY.to_string(),
        out.display().to_string(),
    ]);
    args
}

pub fn merge_args(video_in: &Path, audio_in: &Path, out: &Path) -> Vec<String> {
    let mut args = ffmpeg_prelude();
    args.extend([
        "-i".to_string(),
        video_in.display().to_string(),
        "-i".to_string(),
        audio_in.display().to_string(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        MERGED_AUDIO_CODEC.to_string(),
        "-shortest".to_string(),
        out.display().to_string(),
    ]);
    args
}

pub fn extract_frames_args(video_in: &Path, frame_pattern: &Path) -> Vec<String> {
    let mut args = ffmpeg_prelude();
    args.extend([
        "-i".to_string(),
        video_in.display().to_string(),
        "-start_number".to_string(),
        "1".to_string(),
        frame_pattern.display().to_string(),
    ]);
    args
}

pub fn upscale_frames_args(
    input_dir: &Path,
    output_dir: &Path,
    model: &str,
    scale: u32,
    format: &str,
) -> Vec<String> {
    vec![
        "-i".to_string(),
        input_dir.display().to_string(),
        "-o".to_string(),
        output_dir.display().to_string(),
        "-n".to_string(),
        model.to_string(),
        "-s".to_string(),
        scale.to_string(),
        "-f".to_string(),
        format.to_string(),
    ]
}

pub fn reassemble_args(
    frame_pattern: &Path,
    framerate: Framerate,
    crf: u32,
    out: &Path,
) -> Vec<String> {
    let mut args = ffmpeg_prelude();
    args.extend([
        "-framerate".to_string(),
        framerate.to_string(),
        "-start_number".to_string(),
        "1".to_string(),
        "-i".to_string(),
        frame_pattern.display().to_string(),
        "-c:v".to_string(),
        REASSEMBLY_CODEC.to_string(),
        "-pix_fmt".to_string(),
        REASSEMBLY_PIX_FMT.to_string(),
        "-crf".to_string(),
        crf.to_string(),
        out.display().to_string(),
    ]);
    args
}
