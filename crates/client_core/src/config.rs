use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use tracing::warn;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub success_reset_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 15,
            success_reset_secs: 5,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn success_reset_delay(&self) -> Duration {
        Duration::from_secs(self.success_reset_secs)
    }

    pub fn api_base_url(&self) -> anyhow::Result<Url> {
        let normalized = normalize_api_base_url(&self.api_base_url);
        Url::parse(&normalized)
            .with_context(|| format!("invalid finance api base url '{normalized}'"))
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file_overrides(&mut settings, path, &raw);
    }
    apply_env_overrides(&mut settings, env);

    settings.api_base_url = normalize_api_base_url(&settings.api_base_url);
    settings
}

fn apply_file_overrides(settings: &mut ClientSettings, path: &Path, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, toml::Value>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(path = %path.display(), "config: ignoring unparseable settings file: {err}");
            return;
        }
    };

    if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
        settings.api_base_url = v.to_string();
    }
    if let Some(parsed) = file_cfg.get("request_timeout_secs").and_then(secs_value) {
        settings.request_timeout_secs = parsed;
    }
    if let Some(parsed) = file_cfg.get("success_reset_secs").and_then(secs_value) {
        settings.success_reset_secs = parsed;
    }
}

/// Accepts `3` as well as `"3"`.
fn secs_value(value: &toml::Value) -> Option<u64> {
    match value {
        toml::Value::Integer(n) => u64::try_from(*n).ok(),
        toml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn apply_env_overrides(settings: &mut ClientSettings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("BOTBI_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = env("APP__SUCCESS_RESET_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.success_reset_secs = parsed;
        }
    }
}

pub fn normalize_api_base_url(raw_api_base_url: &str) -> String {
    let raw_api_base_url = raw_api_base_url.trim();

    if raw_api_base_url.is_empty() {
        return DEFAULT_API_BASE_URL.to_string();
    }

    let trimmed = raw_api_base_url.trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
