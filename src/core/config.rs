use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::alerts::engine::AlertEngineConfig;

/// Application settings with alert configuration.
/// Relative paths are resolved against the directory holding settings.json.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Directory holding the source datasets
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// SQLite database holding the alert table
    #[serde(default = "default_alert_db")]
    pub alert_db: PathBuf,
    /// Alert rule configuration
    #[serde(default)]
    pub alert_settings: AlertEngineConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_alert_db() -> PathBuf {
    PathBuf::from("alerts.db")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            alert_db: default_alert_db(),
            alert_settings: AlertEngineConfig::default_enabled(),
        }
    }
}

pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_path: config_dir.join("settings.json"),
            config_dir,
        }
    }

    /// Load settings, falling back to defaults when the file is missing or unreadable.
    pub fn load(&self) -> Settings {
        if !self.config_path.exists() {
            return Settings::default();
        }
        match fs::read_to_string(&self.config_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!(
                        "Invalid settings in {}: {}; using defaults",
                        self.config_path.display(),
                        e
                    );
                    Settings::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", self.config_path.display(), e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }

    /// Resolve a settings path against the config directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }
}
