//! Dataset catalog
//!
//! A catalog is an immutable snapshot of every candidate dataset: the local
//! datasets found below the data root and the remote ones published in the
//! configured manifests, each list in its own deterministic order. Refreshing
//! builds a new snapshot; readers of the old one are unaffected.
//!
//! # Module Organization
//!
//! - [`config`] - CatalogConfig and SourceConfig
//! - [`local`] - Recursive scan of the data root
//! - [`remote`] - Manifest ingestion
//!
//! # Examples
//!
//! ```rust,no_run
//! use geodata_catalog::app::catalog::{Catalog, CatalogConfig, SourceConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CatalogConfig::new("/var/lib/graphs")
//!     .with_source(SourceConfig::new("graphhopper", "/etc/graphs/graphhopper.json"));
//! let catalog = Catalog::build(config)?;
//!
//! for descriptor in catalog.local() {
//!     println!("{}", descriptor);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod local;
pub mod remote;

use std::fs;
use std::time::Instant;

use tracing::{debug, info};

use crate::app::descriptor::DatasetDescriptor;
use crate::errors::{CatalogError, CatalogResult};

pub use config::{CatalogConfig, SourceConfig};
pub use local::{scan_local, sort_local};
pub use remote::{ingest_remote, sort_remote};

/// Ordered local and remote descriptors
#[derive(Debug, Clone)]
pub struct Catalog {
    config: CatalogConfig,
    local: Vec<DatasetDescriptor>,
    remote: Vec<DatasetDescriptor>,
}

impl Catalog {
    /// Scan the data root and ingest every configured manifest
    ///
    /// The data root is created when missing. Unavailable manifests are
    /// skipped; only a data root that cannot be read fails the build.
    pub fn build(config: CatalogConfig) -> CatalogResult<Self> {
        let start = Instant::now();

        fs::create_dir_all(&config.data_root).map_err(|_| {
            CatalogError::DirectoryNotAccessible {
                path: config.data_root.clone(),
            }
        })?;

        let local = scan_local(&config.data_root)?;
        info!(
            "Found {} local datasets in {} in {}ms",
            local.len(),
            config.data_root.display(),
            start.elapsed().as_millis()
        );

        let remote = ingest_remote(&config.sources, &config.data_root);
        debug!(
            "Ingested {} remote datasets from {} sources",
            remote.len(),
            config.sources.len()
        );

        Ok(Self {
            config,
            local,
            remote,
        })
    }

    /// Assemble a catalog from already constructed descriptors, ordering them
    pub fn from_descriptors(
        config: CatalogConfig,
        mut local: Vec<DatasetDescriptor>,
        mut remote: Vec<DatasetDescriptor>,
    ) -> Self {
        sort_local(&mut local);
        sort_remote(&mut remote);
        Self {
            config,
            local,
            remote,
        }
    }

    /// Build a fresh catalog with the same configuration
    pub fn refresh(&self) -> CatalogResult<Self> {
        Self::build(self.config.clone())
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn local(&self) -> &[DatasetDescriptor] {
        &self.local
    }

    pub fn remote(&self) -> &[DatasetDescriptor] {
        &self.remote
    }

    /// All descriptors, local ones first
    pub fn descriptors(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        self.local.iter().chain(self.remote.iter())
    }

    /// First descriptor whose derived name matches `identifier`
    pub fn find_by_identifier(&self, identifier: &str) -> Option<&DatasetDescriptor> {
        self.descriptors()
            .find(|descriptor| descriptor.matches_identifier(identifier))
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }
}
