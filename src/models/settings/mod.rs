// Settings module
// Client configuration loaded from config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Environment variable overriding `api_base_url`.
pub const API_URL_ENV: &str = "TUTOR_DESK_API_URL";

const CONFIG_FILE_NAME: &str = "config.toml";
const STORAGE_FILE_NAME: &str = "local_storage.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub revalidate_interval_minutes: u64,
    pub max_session_age_hours: u64,
    pub storage_path: Option<PathBuf>,
    pub default_student_id: Option<i64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 20,
            revalidate_interval_minutes: 30,
            max_session_age_hours: 8,
            storage_path: None,
            default_student_id: None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err("API base URL must start with http:// or https://".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be greater than 0 seconds".to_string());
        }

        if self.revalidate_interval_minutes == 0 {
            return Err("Re-validation interval must be greater than 0 minutes".to_string());
        }

        if self.max_session_age_hours == 0 {
            return Err("Maximum session age must be greater than 0 hours".to_string());
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn revalidate_interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.revalidate_interval_minutes as i64)
    }

    pub fn max_session_age(&self) -> chrono::Duration {
        chrono::Duration::hours(self.max_session_age_hours as i64)
    }

    /// Parses and validates a config document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).context("Failed to parse config TOML")?;
        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
        Ok(config)
    }

    /// Loads the config file at `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Loads the per-user config, falling back to defaults on any problem,
    /// then applies the environment override.
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) => Self::load_from(&path).unwrap_or_else(|err| {
                log::warn!("Using default configuration: {:#}", err);
                Self::default()
            }),
            None => Self::default(),
        };

        config.apply_env_override();
        config
    }

    pub fn apply_env_override(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                self.api_base_url = url.to_string();
            } else if !url.is_empty() {
                log::warn!("Ignoring {}: '{}' is not an http(s) URL", API_URL_ENV, url);
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create config directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config file {}", path.display()))
    }

    pub fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Location of the durable session storage database.
    pub fn resolve_storage_path(&self) -> PathBuf {
        if let Some(path) = &self.storage_path {
            return path.clone();
        }

        project_dirs()
            .map(|dirs| dirs.data_dir().join(STORAGE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(STORAGE_FILE_NAME))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "TutorDesk", "TutorDesk")
}
