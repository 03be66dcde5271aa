//! Configuration management for the geodata catalog
//!
//! A TOML file declares the data root, the remote manifests and the download
//! settings. Every section is optional; missing values fall back to defaults.
//! The file is converted into explicit runtime configurations handed to the
//! catalog and the download orchestrator, so nothing is looked up globally.
//!
//! ```toml
//! [catalog]
//! data_root = "/var/lib/graphs"
//!
//! [[sources]]
//! name = "graphhopper"
//! manifest = "/etc/geodata-catalog/graphhopper.json"
//! base_url = "https://mirror.example.org/graphs/"
//!
//! [download]
//! request_timeout_secs = 600
//! max_retries = 3
//!
//! [logging]
//! level = "debug"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{CatalogConfig, FetchConfig, SourceConfig};
use crate::constants::files::{APP_DIR_NAME, CONFIG_FILE_NAME};
use crate::constants::{http, logging};
use crate::errors::{ConfigError, ConfigResult};

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Local catalog settings
    pub catalog: CatalogConfigToml,
    /// Remote manifests, in priority order
    pub sources: Vec<SourceConfig>,
    /// Download settings
    pub download: DownloadConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly catalog configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CatalogConfigToml {
    /// Data root (leave unset to use the platform data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_root: Option<PathBuf>,
}

/// TOML-friendly download configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfigToml {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Maximum retry attempts per file
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,
    /// Verify published checksums
    pub verify_checksums: bool,
}

impl Default for DownloadConfigToml {
    fn default() -> Self {
        Self {
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            max_retries: http::MAX_RETRIES,
            retry_delay_ms: http::RETRY_BASE_DELAY_MS,
            verify_checksums: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Convert TOML-friendly configuration to runtime configuration
    pub fn to_runtime_config(&self) -> (CatalogConfig, FetchConfig) {
        (self.catalog_config(), self.download.to_runtime_config())
    }

    fn catalog_config(&self) -> CatalogConfig {
        let mut config = CatalogConfig::default();
        if let Some(data_root) = &self.catalog.data_root {
            config.data_root = data_root.clone();
        }
        config.sources = self.sources.clone();
        config
    }

    /// Load configuration from an explicit file or the default location
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config = match config_file_override {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound { path }),
            Some(path) => Self::load_from_file(&path).await?,
            None => match Self::find_config_file() {
                Some(path) => Self::load_from_file(&path).await?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the runtime configuration unusable
    pub fn validate(&self) -> ConfigResult<()> {
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("Expected one of {}", LOG_LEVELS.join(", ")),
            });
        }

        if self.download.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "download.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be positive".to_string(),
            });
        }

        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "sources.name".to_string(),
                    value: source.name.clone(),
                    reason: "Source name must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(format!("./{}.toml", APP_DIR_NAME))];
        search_paths.extend(Self::default_config_path());

        let found = search_paths.into_iter().find(|path| path.exists());
        if let Some(path) = &found {
            debug!("Found config file: {}", path.display());
        }
        found
    }

    /// Default config file path for the current user
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }
}

impl DownloadConfigToml {
    /// Convert to runtime FetchConfig
    pub fn to_runtime_config(&self) -> FetchConfig {
        FetchConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_retries: self.max_retries,
            retry_base_delay: Duration::from_millis(self.retry_delay_ms),
            verify_checksums: self.verify_checksums,
        }
    }
}
