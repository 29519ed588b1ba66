//! Configuration management.
//!
//! Configuration is read from `~/.config/fedicat/config.toml` when it
//! exists; otherwise defaults are used. Nothing is written back.
//!
//! ```toml
//! # Wrap column for status text
//! width = 78
//!
//! # Command used to page output on a terminal
//! pager = "less"
//!
//! [http]
//! timeout_secs = 30
//! user_agent = "fedicat/0.1.0"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`Config::width`].
pub const WIDTH_ENV: &str = "FEDICAT_WIDTH";

pub const DEFAULT_WIDTH: usize = 78;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub width: usize,
    pub pager: Option<String>,
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            pager: None,
            http: HttpConfig::default(),
        }
    }
}

/// Settings handed to the HTTP fetcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Log every request and response header. Set from `--debug`.
    #[serde(skip)]
    pub trace: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("fedicat/", env!("CARGO_PKG_VERSION")).to_string(),
            trace: false,
        }
    }
}

impl Config {
    /// Load configuration from the default path, then apply environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::default_config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from `path`. A missing file yields defaults.
    /// Missing fields in the file use default values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        if config.width == 0 {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                reason: "width must be positive".into(),
            });
        }

        Ok(config)
    }

    /// Get the default config file path: `~/.config/fedicat/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("fedicat").join("config.toml"))
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = var(WIDTH_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(width) if width > 0 => self.width = width,
                _ => tracing::warn!("ignoring {}={:?}", WIDTH_ENV, raw),
            }
        }
        if self.pager.is_none() {
            self.pager = var("PAGER").filter(|p| !p.trim().is_empty());
        }
    }

    /// The pager command line, split into program and arguments.
    pub fn pager_command(&self) -> Vec<String> {
        self.pager
            .as_deref()
            .unwrap_or("less")
            .split_whitespace()
            .map(String::from)
            .collect()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

impl From<ConfigError> for crate::app::FedicatError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert!(config.pager.is_none());
        assert_eq!(config.http.timeout_secs, 30);
        assert!(!dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "width = 100\n[http]\ntimeout_secs = 5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.width, 100);
        assert_eq!(config.http.timeout_secs, 5);
        assert!(config.http.user_agent.starts_with("fedicat/"));
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "width = \"wide\"").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse { .. })));

        fs::write(&path, "width = 0").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_env_width_override() {
        let mut config = Config::default();
        config.apply_env(env(&[(WIDTH_ENV, "60")]));
        assert_eq!(config.width, 60);

        config.apply_env(env(&[(WIDTH_ENV, "zero")]));
        assert_eq!(config.width, 60);

        config.apply_env(env(&[(WIDTH_ENV, "0")]));
        assert_eq!(config.width, 60);
    }

    #[test]
    fn test_pager_resolution() {
        let mut config = Config::default();
        config.apply_env(env(&[]));
        assert_eq!(config.pager_command(), vec!["less"]);

        let mut config = Config::default();
        config.apply_env(env(&[("PAGER", "most -s")]));
        assert_eq!(config.pager_command(), vec!["most", "-s"]);

        let mut config: Config = toml::from_str("pager = \"more\"").unwrap();
        config.apply_env(env(&[("PAGER", "most")]));
        assert_eq!(config.pager_command(), vec!["more"]);
    }
}
