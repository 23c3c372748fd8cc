use crate::backend::{AudioBackend, VideoBackend};
use crate::{logi, logok};
use anyhow::{Context, Result};
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

const VIDEO_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);
const AUDIO_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// The locator as a downloadable URL, or `None` for anything that should be
/// treated as a local path.
fn remote_url(locator: &str) -> Option<Url> {
    let url = Url::parse(locator).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Stores the asset behind `locator` at `dest`, downloading remote URLs and
/// copying local files. One attempt, no retries.
pub async fn fetch_asset(
    client: &Client,
    locator: &str,
    dest: &Path,
    timeout: Duration,
) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create dir {}", parent.display()))?;
    }

    if let Some(url) = remote_url(locator) {
        let resp = client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("Download request failed: {}", locator))?
            .error_for_status()
            .with_context(|| format!("Download rejected: {}", locator))?;
        let bytes = resp.bytes().await.context("Download read failed")?;
        fs::write(dest, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", dest.display()))?;
    } else {
        fs::copy(locator, dest)
            .await
            .with_context(|| format!("Failed to copy {} -> {}", locator, dest.display()))?;
    }
    Ok(())
}

/// Generates the base clip and saves it under `<assets>/videos/`.
pub struct VideoAgent {
    backend: Box<dyn VideoBackend>,
    client: Client,
    assets_dir: PathBuf,
}

impl VideoAgent {
    pub fn new(backend: Box<dyn VideoBackend>, client: Client, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            client,
            assets_dir: assets_dir.into(),
        }
    }

    pub async fn run(&self, image: &Path, video_prompt: &str, filename: &str) -> Result<PathBuf> {
        let locator = self.backend.generate(image, video_prompt).await?;
        let output = self.assets_dir.join("videos").join(filename);
        logi(format!("Saving base video {} -> {}", locator, output.display()));
        fetch_asset(&self.client, &locator, &output, VIDEO_DOWNLOAD_TIMEOUT).await?;
        logok(format!("Base video ready: {}", output.display()));
        Ok(output)
    }
}

/// Generates the ambient sound bed and saves it under `<assets>/audio/`.
pub struct SoundAgent {
    backend: Box<dyn AudioBackend>,
    client: Client,
    assets_dir: PathBuf,
}

impl SoundAgent {
    pub fn new(backend: Box<dyn AudioBackend>, client: Client, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            client,
            assets_dir: assets_dir.into(),
        }
    }

    pub async fn run(&self, audio_prompt: &str, filename: &str, duration_seconds: f64) -> Result<PathBuf> {
        let locator = self.backend.generate(audio_prompt, duration_seconds).await?;
        let output = self.assets_dir.join("audio").join(filename);
        logi(format!("Saving base audio {} -> {}", locator, output.display()));
        fetch_asset(&self.client, &locator, &output, AUDIO_DOWNLOAD_TIMEOUT).await?;
        logok(format!("Base audio ready: {}", output.display()));
        Ok(output)
    }
}
