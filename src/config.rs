use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{info, LevelFilter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::delivery::DeliveryTimings;
use crate::models::Sender;
use crate::selector::DEFAULT_NARROW_WIDTH;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown log level '{0}'")]
    InvalidLogLevel(String),
}

/// Settings read from `config.json`. Every field is optional in the file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub delivered_after_ms: u64,
    pub read_after_ms: u64,
    pub narrow_width: u16,
    pub local_user: Sender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_conversation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            delivered_after_ms: 1000,
            read_after_ms: 2000,
            narrow_width: DEFAULT_NARROW_WIDTH,
            local_user: Sender::new("1", "You"),
            initial_conversation: None,
            seed_file: None,
            log_file: PathBuf::from("parley.log"),
            log_level: "debug".to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("parley").join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_reader(file).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if given (it must exist), otherwise the default config
    /// file if there is one, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Ok(default_path) if default_path.exists() => Self::load(&default_path),
            _ => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = File::create(path).map_err(io_err)?;
        serde_json::to_writer_pretty(file, self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn timings(&self) -> DeliveryTimings {
        DeliveryTimings::from_millis(self.delivered_after_ms, self.read_after_ms)
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timings(), DeliveryTimings::default());
        assert_eq!(config.narrow_width, 80);
        assert_eq!(config.local_user.name, "You");
        assert_eq!(config.log_level().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{ "read_after_ms": 500, "log_level": "warn" }}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.read_after_ms, 500);
        assert_eq!(config.delivered_after_ms, 1000);
        assert_eq!(config.log_level().unwrap(), LevelFilter::Warn);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.initial_conversation = Some("3".to_string());
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            Config::load_or_default(Some(missing.as_path())),
            Err(ConfigError::Io { .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Json { .. })));

        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.log_level(),
            Err(ConfigError::InvalidLogLevel(level)) if level == "loud"
        ));
    }
}
