use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Produces a short loop-friendly clip animated from a still image.
///
/// Implementations return a locator for the clip: an `http(s)` URL or a
/// local file path.
#[async_trait]
pub trait VideoBackend: Send + Sync {
    async fn generate(&self, image: &Path, video_prompt: &str) -> Result<String>;
}

/// Produces an ambient sound bed from a text prompt.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    async fn generate(&self, audio_prompt: &str, duration_seconds: f64) -> Result<String>;
}

/// Hands back a fixed local clip; used for dry runs.
#[derive(Debug, Clone)]
pub struct MockVideoBackend {
    source: PathBuf,
}

impl MockVideoBackend {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl Default for MockVideoBackend {
    fn default() -> Self {
        Self::new("assets/mock/mock_video.mp4")
    }
}

#[async_trait]
impl VideoBackend for MockVideoBackend {
    async fn generate(&self, _image: &Path, _video_prompt: &str) -> Result<String> {
        Ok(self.source.display().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct MockAudioBackend {
    source: PathBuf,
}

impl MockAudioBackend {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl Default for MockAudioBackend {
    fn default() -> Self {
        Self::new("assets/mock/mock_audio.mp3")
    }
}

#[async_trait]
impl AudioBackend for MockAudioBackend {
    async fn generate(&self, _audio_prompt: &str, _duration_seconds: f64) -> Result<String> {
        Ok(self.source.display().to_string())
    }
}
