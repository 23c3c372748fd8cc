//! Numbered still-image sequences shared by the extractor, the upscaler and
//! the reassembler.
//!
//! Frames are named `frame_%06d.jpg` starting at 1. Every stage reads and
//! writes exactly this pattern; a gap in the numbering makes the image2
//! demuxer stop early, so sequences are checked for contiguity.

use crate::error::{PipelineError, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// printf-style pattern handed to ffmpeg.
pub const FRAME_PATTERN: &str = "frame_%06d.jpg";
/// Image format of every stored frame.
pub const FRAME_FORMAT: &str = "jpg";

pub fn frame_file_name(index: usize) -> String {
    format!("frame_{:06}.{}", index, FRAME_FORMAT)
}

pub fn frame_pattern(dir: &Path) -> PathBuf {
    dir.join(FRAME_PATTERN)
}

fn frame_name_regex() -> Result<&'static Regex> {
    static FRAME_RE: OnceCell<Regex> = OnceCell::new();
    FRAME_RE
        .get_or_try_init(|| Regex::new(r"^frame_(\d{6,})\.jpg$"))
        .map_err(PipelineError::from)
}

/// A contiguous run of frames `1..=count` inside `dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSequence {
    dir: PathBuf,
    count: usize,
}

impl FrameSequence {
    /// Counts the frames in `dir`, ignoring files that do not follow the
    /// naming pattern. Fails if the numbering has a gap or does not start at 1.
    pub fn scan(dir: &Path) -> Result<Self> {
        let re = frame_name_regex()?;
        let mut indices = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| PipelineError::io(dir, e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if let Some(caps) = re.captures(&name) {
                if let Ok(index) = caps[1].parse::<usize>() {
                    indices.push(index);
                }
            }
        }

        indices.sort_unstable();
        for (position, index) in indices.iter().enumerate() {
            if *index != position + 1 {
                return Err(PipelineError::BrokenFrameSequence {
                    dir: dir.to_path_buf(),
                    missing: position + 1,
                });
            }
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            count: indices.len(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn pattern(&self) -> PathBuf {
        frame_pattern(&self.dir)
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(frame_file_name(index))
    }
}

#[cfg(test)]
pub(crate) fn write_frames(dir: &Path, count: usize) {
    std::fs::create_dir_all(dir).unwrap();
    for i in 1..=count {
        std::fs::write(dir.join(frame_file_name(i)), b"jpg").unwrap();
    }
}
