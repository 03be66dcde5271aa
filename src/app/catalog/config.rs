//! Catalog configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::files::APP_DIR_NAME;

/// A remote manifest to ingest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Name used in logs when the manifest cannot be loaded
    pub name: String,
    /// Path of the JSON manifest
    pub manifest: PathBuf,
    /// Base URL overriding the one published in the manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl SourceConfig {
    pub fn new(name: impl Into<String>, manifest: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            manifest: manifest.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Everything needed to build a catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Root directory holding local datasets and fetched remote files
    pub data_root: PathBuf,
    /// Remote manifests, in priority order
    pub sources: Vec<SourceConfig>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let data_root = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("./data"));

        Self {
            data_root,
            sources: Vec::new(),
        }
    }
}

impl CatalogConfig {
    /// Create a configuration for a data root without remote sources
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            sources: Vec::new(),
        }
    }

    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> Self {
        self.data_root = data_root.into();
        self
    }

    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.sources.push(source);
        self
    }
}
