use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::EmployeeId;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "workdesk.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    /// Acting employee until sign-in exists; used as list owner and evaluator.
    pub employee_id: EmployeeId,
    pub cache_ttl_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/".into(),
            employee_id: EmployeeId(10002),
            cache_ttl_seconds: 300,
        }
    }
}

impl Settings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    employee_id: Option<i64>,
    cache_ttl_seconds: Option<u64>,
}

/// Defaults, then `path` (when it exists), then process environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?;
        if let Some(v) = file_cfg.api_base_url {
            settings.api_base_url = v;
        }
        if let Some(v) = file_cfg.employee_id {
            settings.employee_id = EmployeeId(v);
        }
        if let Some(v) = file_cfg.cache_ttl_seconds {
            settings.cache_ttl_seconds = v;
        }
    }

    if let Some(v) = env("WORKDESK_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    for key in ["WORKDESK_EMPLOYEE_ID", "APP__EMPLOYEE_ID"] {
        if let Some(v) = env(key) {
            match v.trim().parse::<i64>() {
                Ok(parsed) => settings.employee_id = EmployeeId(parsed),
                Err(_) => warn!(key, value = %v, "config: ignoring non-numeric employee id"),
            }
        }
    }

    if let Some(v) = env("APP__CACHE_TTL_SECONDS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.cache_ttl_seconds = parsed,
            Err(_) => warn!(value = %v, "config: ignoring invalid cache ttl"),
        }
    }

    settings.api_base_url = normalize_api_base_url(&settings.api_base_url);
    Ok(settings)
}

pub fn normalize_api_base_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return Settings::default().api_base_url;
    }

    let mut url = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
