use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};

pub mod agents;
pub mod backend;
pub mod concat_list;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod frames;
pub mod init;
pub mod looper;
pub mod merge;
pub mod pipeline;
pub mod plan;
pub mod probe;
pub mod runner;
pub mod upscale;

pub use error::{PipelineError, Result};

pub type PipelineLogHook = Arc<Mutex<dyn Fn(&str) + Send + Sync + 'static>>;

static LOG_HOOK: Lazy<Mutex<Option<PipelineLogHook>>> = Lazy::new(|| Mutex::new(None));

/// Mirrors every pipeline log line to `hook` until replaced or cleared with `None`.
pub fn set_log_hook(hook: Option<PipelineLogHook>) {
    if let Ok(mut guard) = LOG_HOOK.lock() {
        *guard = hook;
    }
}

pub(crate) fn logv(tag: &str, message: &str) {
    match tag {
        "WARN" => tracing::warn!("{}", message),
        "OK" => tracing::info!(status = "ok", "{}", message),
        _ => tracing::info!("{}", message),
    }

    if let Ok(guard) = LOG_HOOK.lock() {
        if let Some(hook) = guard.as_ref() {
            if let Ok(callback) = hook.lock() {
                let line = format!("[{}] {}", tag, message);
                callback(&line);
            }
        }
    }
}

pub(crate) fn logi(message: impl AsRef<str>) {
    logv("INFO", message.as_ref());
}

pub(crate) fn logok(message: impl AsRef<str>) {
    logv("OK", message.as_ref());
}

pub(crate) fn logw(message: impl AsRef<str>) {
    logv("WARN", message.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_receives_tagged_lines() {
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&lines);
        let hook: PipelineLogHook = Arc::new(Mutex::new(move |line: &str| {
            sink.lock().unwrap().push(line.to_string());
        }));

        set_log_hook(Some(hook));
        logw("concat list still present");
        set_log_hook(None);
        logw("after removal");

        let lines = lines.lock().unwrap();
        assert!(lines.contains(&"[WARN] concat list still present".to_string()));
        assert!(!lines.iter().any(|l| l.contains("after removal")));
    }
}
