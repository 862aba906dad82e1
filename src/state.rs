use crate::config::{AppConfig, ConfigSource};
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const CONFIG_FILE: &str = "config.json";

/// File-backed settings living under `~/.cursor-balance`.
pub struct AppState {
    pub config: AppConfig,
    pub config_dir: PathBuf,
}

impl AppState {
    /// Opens the default configuration directory.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be found or the config
    /// directory cannot be created.
    pub fn new() -> Result<Self> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(".cursor-balance");
        Self::with_dir(config_dir)
    }

    /// Opens settings stored in `config_dir`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn with_dir(config_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&config_dir)?;
        let config = Self::load_config(&config_dir);
        Ok(Self { config, config_dir })
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    #[must_use]
    pub fn panels_dir(&self) -> PathBuf {
        self.config_dir.join("panels")
    }

    fn load_config(config_dir: &Path) -> AppConfig {
        let config_path = config_dir.join(CONFIG_FILE);
        fs::read_to_string(&config_path)
            .ok()
            .and_then(|content| {
                serde_json::from_str(&content)
                    .inspect_err(|e| {
                        warn!(path = %config_path.display(), "Failed to parse config file, using defaults: {e}");
                    })
                    .ok()
            })
            .unwrap_or_default()
    }

    /// Saves the configuration to disk.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be written.
    pub fn save_config(&mut self, config: AppConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(&config)?;
        fs::write(self.config_path(), content)?;
        self.config = config;
        Ok(())
    }
}

impl ConfigSource for AppState {
    fn get(&self, key: &str) -> Option<String> {
        self.config.get(key)
    }
}
