//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! analog-watch.toml file. It covers the redraw cadence, the location of the
//! preference file and the size of the ASCII preview. Window geometry and
//! label toggles are user state, kept in the preference store instead.

use crate::preferences::TomlPreferences;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "analog-watch.toml";

/// Application configuration loaded from analog-watch.toml
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Redraw timer settings
    pub timer: TimerConfig,
    /// Preference store settings
    pub preferences: PreferencesConfig,
    /// Terminal preview settings
    pub preview: PreviewConfig,
}

/// Redraw timer configuration
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Milliseconds between redraw requests
    pub tick_ms: u64,
}

/// Preference store configuration
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// Preference file; defaults to the user's config directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Terminal preview configuration
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Widget size rendered by `--stdout` and `--watch`
    pub ascii_size: i32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self { tick_ms: 100 }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { ascii_size: 124 }
    }
}

impl Config {
    /// Load configuration from analog-watch.toml.
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path.
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!("invalid config file format: {}", e);
                    warn!("using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!("no config file found, using default configuration");
                Self::default()
            }
        }
    }

    /// Save current configuration to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// Redraw cadence, never shorter than one millisecond.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.timer.tick_ms.max(1))
    }

    /// Preference file to open.
    pub fn preferences_path(&self) -> PathBuf {
        self.preferences
            .path
            .clone()
            .unwrap_or_else(TomlPreferences::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timer.tick_ms, 100);
        assert_eq!(config.tick(), Duration::from_millis(100));
        assert_eq!(config.preview.ascii_size, 124);
        assert!(config.preferences.path.is_none());
        assert!(config.preferences_path().ends_with("preferences.toml"));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.timer.tick_ms = 250;
        config.preferences.path = Some(PathBuf::from("/tmp/watch-prefs.toml"));
        config.save(&path).unwrap();

        let parsed = Config::load_from_path(&path);
        assert_eq!(parsed.timer.tick_ms, 250);
        assert_eq!(parsed.preferences_path(), PathBuf::from("/tmp/watch-prefs.toml"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[preview]\nascii_size = 204\n").unwrap();

        let config = Config::load_from_path(&path);
        assert_eq!(config.preview.ascii_size, 204);
        assert_eq!(config.timer.tick_ms, 100);
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let mut config = Config::default();
        config.timer.tick_ms = 0;
        assert_eq!(config.tick(), Duration::from_millis(1));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.timer.tick_ms, 100);
    }
}
