//! Remote manifest parsing
//!
//! A manifest is a JSON document published by one source, listing the files
//! available for download below a base URL together with their size, checksum,
//! timestamp and bounding box. Every field but the URI is optional.
//!
//! # Module Organization
//!
//! - [`types`] - ManifestSource, ManifestEntry and ManifestStats
//! - [`loader`] - Parsing and validation of manifest files
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use geodata_catalog::app::manifest::load_manifest;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (source, stats) = load_manifest(Path::new("graphhopper.json"))?;
//! println!("{}: {} files, {:.1}% valid", source.name, source.files.len(), stats.success_rate());
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod types;

pub use loader::{load_manifest, parse_manifest};
pub use types::{ManifestEntry, ManifestSource, ManifestStats};
