use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};

pub mod api;
pub mod captions;
pub mod compose;
pub mod config;
pub mod ffmpeg;
pub mod init;

/// Receives every tagged pipeline log line, e.g. to mirror it in a job view.
pub type LogHook = Arc<Mutex<dyn Fn(&str) + Send + Sync + 'static>>;

static LOG_HOOK: Lazy<Mutex<Option<LogHook>>> = Lazy::new(|| Mutex::new(None));

/// Installs (or with `None` removes) the hook. Lines reach it as
/// `[TAG] message` after they have gone to `tracing`.
pub fn set_log_hook(hook: Option<LogHook>) {
    if let Ok(mut guard) = LOG_HOOK.lock() {
        *guard = hook;
    }
}

// `WARN` maps to `tracing::warn!`; every other tag (`INFO`, `OK`) is an
// info event carrying the tag as a field.
pub(crate) fn logv(tag: &str, message: &str) {
    match tag {
        "WARN" => tracing::warn!("{}", message),
        _ => tracing::info!(tag, "{}", message),
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
