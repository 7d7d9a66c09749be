//! Configuration file handling for ascii-reel.
//!
//! Loads configuration from `~/.config/ascii-reel/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ascii::{Palette, DEFAULT_TARGET_WIDTH};
use crate::cache::DEFAULT_IDLE_TIMEOUT;
use crate::jobs::DEFAULT_MAX_CONCURRENT;

/// Configuration file structure for ascii-reel.
/// Loaded from ~/.config/ascii-reel/config.toml (or custom path via --config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `{name}.txt.gz` archives
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { dir: default_dir() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Columns used when a submission doesn't name a width
    #[serde(default = "default_width")]
    pub default_width: u32,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            default_width: default_width(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Archives loaded and pinned at startup
    #[serde(default)]
    pub preload: Vec<String>,
}

impl CacheConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            preload: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// `classic` or `standard`
    #[serde(default = "default_palette")]
    pub palette: String,
    /// Map bright pixels to dense glyphs (for light terminals)
    #[serde(default)]
    pub invert: bool,
}

impl RenderConfig {
    /// Parsed palette, falling back to the default for unknown names.
    /// `Config::validate` rejects unknown names before this matters.
    pub fn palette(&self) -> Palette {
        Palette::from_name(&self.palette).unwrap_or_default()
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            invert: false,
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("./files")
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

fn default_width() -> u32 {
    DEFAULT_TARGET_WIDTH
}

fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT.as_secs()
}

fn default_palette() -> String {
    Palette::default().name().to_string()
}

impl Config {
    /// Load configuration from a file path, or the default path if `None`.
    /// Returns default config if the default file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_explicit(path),
            None => {
                let path = default_path();
                if path.exists() {
                    Self::load_file(&path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    /// Load from a path the user named. A missing file is an error here.
    pub fn load_from_explicit(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::IoError {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }
        Self::load_file(path)
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError { source, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "jobs.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.jobs.default_width == 0 {
            return Err(ConfigError::Invalid(
                "jobs.default_width must be at least 1".to_string(),
            ));
        }
        if self.cache.idle_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache.idle_timeout_secs must be at least 1".to_string(),
            ));
        }
        if Palette::from_name(&self.render.palette).is_none() {
            return Err(ConfigError::Invalid(format!(
                "render.palette '{}' is not one of: classic, standard",
                self.render.palette
            )));
        }
        Ok(())
    }

    /// Render as TOML, as written by `config init`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    SerializeError(toml::ser::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::SerializeError(source) => {
                write!(f, "Failed to serialize config: {}", source)
            }
            ConfigError::Invalid(reason) => write!(f, "Invalid config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::SerializeError(source) => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("ascii-reel").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/ascii-reel/config.toml")
        })
}
