use crate::plan::{MAX_CROSSFADE_SECONDS, check_crossfade};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,
    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,
    #[serde(rename = "realesrgan_path")]
    #[serde(default = "default_upscaler")]
    pub upscaler_path: String,
    #[serde(default = "default_upscale_model")]
    pub upscale_model: String,
    #[serde(default = "default_upscale_scale")]
    pub upscale_scale: u32,
    #[serde(default = "default_reassembly_crf")]
    pub reassembly_crf: u32,
    #[serde(default = "default_crossfade_seconds")]
    pub crossfade_seconds: f64,
    /// Parent for per-call temp directories; the system temp dir when unset.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_upscaler() -> String {
    "realesrgan-ncnn-vulkan".to_string()
}

fn default_upscale_model() -> String {
    "realesrgan-x4plus".to_string()
}

fn default_upscale_scale() -> u32 {
    2
}

fn default_reassembly_crf() -> u32 {
    18
}

fn default_crossfade_seconds() -> f64 {
    3.0
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
            upscaler_path: default_upscaler(),
            upscale_model: default_upscale_model(),
            upscale_scale: default_upscale_scale(),
            reassembly_crf: default_reassembly_crf(),
            crossfade_seconds: default_crossfade_seconds(),
            temp_dir: None,
            assets_dir: default_assets_dir(),
        }
    }
}

impl Config {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
        Self::from_json(&content)
    }

    /// Loads `path`, or returns the defaults when it does not exist.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        Self::load(path).await
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ffmpeg_path.is_empty() {
            anyhow::bail!("config.json: ffmpeg_path is empty");
        }
        if self.ffprobe_path.is_empty() {
            anyhow::bail!("config.json: ffprobe_path is empty");
        }
        if self.upscaler_path.is_empty() {
            anyhow::bail!("config.json: realesrgan_path is empty");
        }
        if !(2..=4).contains(&self.upscale_scale) {
            anyhow::bail!(
                "config.json: upscale_scale must be 2, 3 or 4 (got {})",
                self.upscale_scale
            );
        }
        if check_crossfade(self.crossfade_seconds).is_err() {
            anyhow::bail!(
                "config.json: crossfade_seconds must be in (0, {}] (got {})",
                MAX_CROSSFADE_SECONDS,
                self.crossfade_seconds
            );
        }
        Ok(())
    }
}
