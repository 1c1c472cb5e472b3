//! Emulator configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default guest RAM size (256 MB)
pub const DEFAULT_RAM_SIZE: usize = 256 * 1024 * 1024;

/// Name of the configuration directory and file stem
const APP_NAME: &str = "oxidized-ppc";

/// Emulator configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Guest memory settings
    pub memory: MemoryConfig,
    /// Logging and diagnostics
    pub debug: DebugConfig,
}

/// Guest memory settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Size of the flat RAM backing store in bytes
    pub ram_size: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            ram_size: DEFAULT_RAM_SIZE,
        }
    }
}

/// Logging and diagnostics settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Minimum level emitted by the subscriber
    pub log_level: LogLevel,
    /// Mirror log output into `log_path`
    pub log_to_file: bool,
    /// Log file location
    pub log_path: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_to_file: false,
            log_path: PathBuf::from(format!("{}.log", APP_NAME)),
        }
    }
}

/// Log verbosity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Config {
    /// Path of the user configuration file, if a config directory exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
    }

    /// Load the user configuration, falling back to defaults when no file exists
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.memory.ram_size, DEFAULT_RAM_SIZE);
        assert_eq!(config.debug.log_level, LogLevel::Info);
        assert!(!config.debug.log_to_file);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml("[memory]\nram_size = 65536\n").unwrap();
        assert_eq!(config.memory.ram_size, 0x10000);
        assert_eq!(config.debug, DebugConfig::default());
    }

    #[test]
    fn test_log_level_parsing() {
        let config = Config::from_toml("[debug]\nlog_level = \"trace\"\n").unwrap();
        assert_eq!(config.debug.log_level, LogLevel::Trace);

        assert!(Config::from_toml("[debug]\nlog_level = \"loud\"\n").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("oxidized-ppc-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut config = Config::default();
        config.memory.ram_size = 1024 * 1024;
        config.debug.log_level = LogLevel::Debug;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("oxidized-ppc-does-not-exist.toml");
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Io(_))));
    }
}
