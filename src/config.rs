//! Application configuration
//!
//! Values come from three layers, lowest precedence first: built-in defaults,
//! an optional JSON file (`pocketplay.json` in the working directory, or the
//! path in `POCKETPLAY_CONFIG`), and a handful of environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILE: &str = "pocketplay.json";
const CONFIG_PATH_ENV: &str = "POCKETPLAY_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub poll_interval_ms: u64,
    pub track_duration_ms: u64,
    pub api_level: u32,
    pub foreground_allowed: bool,
    pub notifications_permitted: bool,
    pub load_playlist_on_start: bool,
    pub resumption_cache_path: Option<PathBuf>,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 20,
            track_duration_ms: 60_000,
            api_level: 34,
            foreground_allowed: true,
            notifications_permitted: true,
            load_playlist_on_start: true,
            resumption_cache_path: Some(PathBuf::from(".cache/resumption.json")),
            log_dir: PathBuf::from(".logs"),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Apply `POCKETPLAY_*` overrides. Unparseable values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("POCKETPLAY_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.poll_interval_ms = v;
        }
        if let Some(v) = lookup("POCKETPLAY_API_LEVEL").and_then(|v| v.parse().ok()) {
            self.api_level = v;
        }
        if let Some(v) = lookup("POCKETPLAY_FOREGROUND_ALLOWED").and_then(|v| parse_flag(&v)) {
            self.foreground_allowed = v;
        }
        if let Some(v) = lookup("POCKETPLAY_NOTIFICATIONS_PERMITTED").and_then(|v| parse_flag(&v)) {
            self.notifications_permitted = v;
        }
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero period would spin the polling task.
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn track_duration(&self) -> Duration {
        Duration::from_millis(self.track_duration_ms)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
