use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use dashboard_core::DEFAULT_VIEWPORT_DEBOUNCE;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "replay.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub viewport_debounce_ms: u64,
    pub log_level: String,
    pub dump_state: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport_debounce_ms: DEFAULT_VIEWPORT_DEBOUNCE.as_millis() as u64,
            log_level: "info".into(),
            dump_state: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    viewport_debounce_ms: Option<u64>,
    log_level: Option<String>,
    dump_state: Option<bool>,
}

/// Defaults, then `replay.toml` (or the explicit `path`), then environment.
/// A missing default file is fine; a missing explicit file is an error.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg = toml::from_str::<FileSettings>(&raw)
                .with_context(|| format!("failed to parse config '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(err) if required => {
            return Err(err).with_context(|| format!("failed to read config '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.viewport_debounce_ms {
        settings.viewport_debounce_ms = v;
    }
    if let Some(v) = file_cfg.log_level {
        settings.log_level = v;
    }
    if let Some(v) = file_cfg.dump_state {
        settings.dump_state = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    for key in ["REPLAY_DEBOUNCE_MS", "APP__VIEWPORT_DEBOUNCE_MS"] {
        if let Some(parsed) = var(key).and_then(|v| v.trim().parse::<u64>().ok()) {
            settings.viewport_debounce_ms = parsed;
        }
    }

    for key in ["REPLAY_LOG", "APP__LOG_LEVEL"] {
        if let Some(v) = var(key).filter(|v| !v.trim().is_empty()) {
            settings.log_level = v;
        }
    }

    if let Some(v) = var("APP__DUMP_STATE") {
        settings.dump_state = matches!(v.trim(), "1" | "true" | "yes");
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
