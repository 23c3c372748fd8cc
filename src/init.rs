use crate::config::Config;
use crate::{logi, logw};
use anyhow::Result;
use std::path::Path;
use tokio::fs;

const ASSET_SUBDIRS: &[&str] = &["images", "videos", "audio", "mock"];

pub async fn ensure_directories(assets_dir: &Path) -> Result<()> {
    for sub in ASSET_SUBDIRS {
        let dir = assets_dir.join(sub);
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            logi(format!("Created directory: {}", dir.display()));
        }
    }
    Ok(())
}

async fn tool_responds(program: &str, probe_arg: &str) -> bool {
    match tokio::process::Command::new(program)
        .arg(probe_arg)
        .output()
        .await
    {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

/// Names of configured tools that cannot be launched.
pub async fn missing_tools(cfg: &Config) -> Vec<String> {
    let mut missing = Vec::new();
    if !tool_responds(&cfg.ffmpeg_path, "-version").await {
        missing.push(cfg.ffmpeg_path.clone());
    }
    if !tool_responds(&cfg.ffprobe_path, "-version").await {
        missing.push(cfg.ffprobe_path.clone());
    }
    // realesrgan prints usage and exits non-zero for -h, so only spawning matters
    if tokio::process::Command::new(&cfg.upscaler_path)
        .arg("-h")
        .output()
        .await
        .is_err()
    {
        missing.push(cfg.upscaler_path.clone());
    }

    for tool in &missing {
        logw(format!("{} not found. Please install it or fix config.json.", tool));
    }
    missing
}
