//! Configuration management for haze.
//!
//! Configuration is loaded from a platform-appropriate `config.toml` with
//! sensible defaults. All config structs implement `Default`, and every
//! section tolerates missing keys via `#[serde(default)]`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for haze.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Media and metadata store settings
    pub store: StoreConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Background scheduler settings
    pub scheduler: SchedulerConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories (e.g. `~/.config/haze/config.toml`
    /// on Linux), falling back to `~/.haze/config.toml` if detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "haze", "haze")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".haze").join("config.toml")
            })
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.batch_limit == 0 {
            return Err(ConfigError::ValidationError(
                "processing.batch_limit must be at least 1".to_string(),
            ));
        }
        if self.limits.process_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.process_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the resolved media root path (with ~ expansion).
    pub fn media_root(&self) -> PathBuf {
        expand(&self.store.media_root)
    }

    /// Get the resolved hash index path (with ~ expansion).
    pub fn index_path(&self) -> PathBuf {
        expand(&self.store.index_path)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}

/// Which metadata store backend to construct.
///
/// Chosen explicitly at construction time; the pipeline never probes for
/// capabilities at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    /// Hash records persisted to a JSON index file
    Json,

    /// Hash records held in memory only (tests, dry runs)
    Memory,
}

/// Media and metadata store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory of the media library
    pub media_root: PathBuf,

    /// Metadata store backend
    pub backend: MetadataBackend,

    /// Path of the JSON hash index (json backend only)
    pub index_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("."),
            backend: MetadataBackend::Json,
            index_path: PathBuf::from("~/.haze/hashes.json"),
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of parallel workers within a batch
    pub parallel_workers: usize,

    /// Max pending assets one batch run may process
    pub batch_limit: usize,

    /// File extensions treated as image assets
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            batch_limit: 50,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Per-asset processing deadline in milliseconds
    pub process_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            process_timeout_ms: 30_000,
        }
    }
}

/// Background scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between backfill batch runs
    pub interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
