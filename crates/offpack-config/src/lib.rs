use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for offpack (`config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Slot the application state is saved under
    #[serde(default = "default_state_key")]
    pub state_key: String,

    /// Overrides the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Delay between two progress steps of the download pipeline
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_key: default_state_key(),
            data_dir: None,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: default_step_delay_ms(),
        }
    }
}

impl DownloadConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

fn default_state_key() -> String {
    "downloadState".to_string()
}

fn default_step_delay_ms() -> u64 {
    500
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, writing the defaults there if it does not exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(path, content)?;
            Ok(config)
        }
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "offpack", "offpack") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.offpack/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.state_key, "downloadState");
        assert_eq!(config.storage.data_dir, None);
        assert_eq!(config.download.step_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.storage.state_key, config.storage.state_key);
        assert_eq!(parsed.download.step_delay_ms, config.download.step_delay_ms);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[download]\nstep_delay_ms = 0\n").unwrap();
        assert_eq!(parsed.download.step_delay_ms, 0);
        assert_eq!(parsed.storage.state_key, "downloadState");
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.download.step_delay_ms, 500);

        std::fs::write(&path, "[storage]\nstate_key = \"custom\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.storage.state_key, "custom");
    }
}
