//! Core catalog and selection logic
//!
//! This module contains the bounding box geometry, the block container
//! reader, dataset descriptors, manifest parsing, catalog construction,
//! coverage selection and fetch delegation.
//!
//! # Examples
//!
//! ```rust,no_run
//! use geodata_catalog::app::{BoundingBox, Catalog, CatalogConfig, CoverageSelector};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::build(CatalogConfig::new("/var/lib/graphs"))?;
//! let target = BoundingBox::from_coordinates(10.1, 53.7, 9.9, 53.5);
//!
//! for descriptor in CoverageSelector::new(&catalog).candidates_for(Some("europe/germany"), &target) {
//!     println!("{}", descriptor);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bounding_box;
pub mod catalog;
pub mod descriptor;
pub mod fetch;
pub mod hash;
pub mod manifest;
pub mod pbf;
pub mod selector;

// Re-export main public API
pub use bounding_box::{BoundingBox, Position};
pub use catalog::{Catalog, CatalogConfig, SourceConfig};
pub use descriptor::{DatasetDescriptor, DatasetKind, RemoteFile};
pub use fetch::{ensure_available, DownloadOrchestrator, FetchConfig, FetchRequest, HttpOrchestrator};
pub use hash::Md5Hash;
pub use manifest::{load_manifest, ManifestEntry, ManifestSource, ManifestStats};
pub use pbf::extract_bounding_box_from_file;
pub use selector::{CoverageSelector, Selection};
