use std::{fs, io, path::Path};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const SETTINGS_FILE: &str = "investments.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    log_filter: Option<String>,
}

/// Defaults, then `investments.toml` from the working directory, then the
/// process environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = load_settings_from(Path::new(SETTINGS_FILE))?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

/// Defaults overlaid with the given settings file. A missing file is not an
/// error.
pub fn load_settings_from(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(settings),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    };

    let file_cfg: FileSettings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;

    if let Some(v) = non_empty(file_cfg.api_url) {
        settings.api_url = v;
    }
    if let Some(v) = non_empty(file_cfg.log_filter) {
        settings.log_filter = v;
    }

    Ok(settings)
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = non_empty(lookup("INVESTMENTS_API_URL")) {
        settings.api_url = v;
    }
    if let Some(v) = non_empty(lookup("APP__API_URL")) {
        settings.api_url = v;
    }

    if let Some(v) = non_empty(lookup("APP__LOG_FILTER")) {
        settings.log_filter = v;
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
