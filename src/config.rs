//! Configuration management for boardscan
//!
//! Config file location:
//! - Linux: ~/.config/boardscan/config.toml
//!
//! You can override the config location by setting `BOARDSCAN_CONFIG_PATH`.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Output preferences
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

            let config: Config = toml::from_str(&content).with_context(|| {
                format!("Failed to parse config from {}", config_path.display())
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, toml)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("BOARDSCAN_CONFIG_PATH") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let proj_dirs = ProjectDirs::from("", "", "boardscan")
            .context("Could not determine project directories")?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

/// Output preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Print board/CPU serial numbers. Off by default so reports can
    /// be shared without leaking a device identifier.
    #[serde(default)]
    pub show_serial: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { show_serial: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_hides_serial() {
        let config = Config::default();
        assert!(!config.display.show_serial);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut config = Config::default();
        config.display.show_serial = true;
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("show_serial"));
        let back: Config = toml::from_str(&toml).unwrap();
        assert!(back.display.show_serial);
    }

    #[test]
    fn test_missing_display_section_uses_defaults() {
        let back: Config = toml::from_str("").unwrap();
        assert!(!back.display.show_serial);
    }
}
