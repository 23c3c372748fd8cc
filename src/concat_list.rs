use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::logw;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Concat-demuxer list naming one source `entries` times.
///
/// The file lives in a fresh uniquely-named temp location and is removed by
/// [`ConcatList::release`], or on drop if the caller bails out early.
pub struct ConcatList {
    file: NamedTempFile,
    entries: usize,
}

impl ConcatList {
    pub fn write(cfg: &Config, source: &Path, entries: usize) -> Result<Self> {
        let source = std::path::absolute(source)
            .map_err(|e| PipelineError::io(source, e))?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("concat-").suffix(".txt");
        let mut file = match &cfg.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| PipelineError::io(cfg.temp_dir.clone().unwrap_or_else(std::env::temp_dir), e))?;

        let contents = list_contents(&source, entries);
        let list_path = file.path().to_path_buf();
        file.write_all(contents.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| PipelineError::io(&list_path, e))?;

        Ok(Self { file, entries })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Deletes the list file. A failed delete is logged, never returned, so it
    /// cannot hide the error of the step that used the list.
    pub fn release(self) {
        let path: PathBuf = self.file.path().to_path_buf();
        if let Err(err) = self.file.close() {
            logw(format!(
                "Failed to remove concat list {}: {}",
                path.display(),
                err
            ));
        }
    }
}

fn list_contents(source: &Path, entries: usize) -> String {
    let line = format!("file '{}'\n", escape_single_quotes(&source.display().to_string()));
    line.repeat(entries)
}

fn escape_single_quotes(path: &str) -> String {
    path.replace('\'', r"'\''")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_in(dir: &Path) -> Config {
        Config {
            temp_dir: Some(dir.to_path_buf()),
            ..Config::default()
        }
    }

    #[test]
    fn writes_one_absolute_line_per_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let list = ConcatList::write(&cfg_in(tmp.path()), Path::new("clip.mp4"), 120).unwrap();
        let text = std::fs::read_to_string(list.path()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 120);
        assert_eq!(list.entries(), 120);
        for line in lines {
            assert!(line.starts_with("file '/"), "not absolute: {line}");
            assert!(line.ends_with("clip.mp4'"));
        }
        list.release();
    }

    #[test]
    fn quotes_in_paths_are_escaped() {
        assert_eq!(
            list_contents(Path::new("/media/it's.mp4"), 1),
            "file '/media/it'\\''s.mp4'\n"
        );
    }

    #[test]
    fn release_removes_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let list = ConcatList::write(&cfg_in(tmp.path()), Path::new("/a.mp4"), 3).unwrap();
        let path = list.path().to_path_buf();
        assert!(path.exists());
        list.release();
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = {
            let list = ConcatList::write(&cfg_in(tmp.path()), Path::new("/a.mp4"), 3).unwrap();
            list.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn list_names_are_unique_per_call() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = cfg_in(tmp.path());
        let a = ConcatList::write(&cfg, Path::new("/a.mp4"), 1).unwrap();
        let b = ConcatList::write(&cfg, Path::new("/a.mp4"), 1).unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().file_name().unwrap().to_string_lossy().ends_with(".txt"));
    }
}
