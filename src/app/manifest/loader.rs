//! Manifest loading with per-entry validation
//!
//! Invalid entries are skipped with a warning rather than failing the whole
//! manifest, the same way a malformed line never aborts a stream.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::types::{ManifestEntry, ManifestSource, ManifestStats};
use crate::errors::{ManifestError, ManifestResult};

/// Manifest with entries kept as raw JSON until each is decoded on its own
#[derive(Deserialize)]
struct RawManifest {
    name: String,
    base_url: String,
    #[serde(default)]
    files: Vec<Value>,
}

/// Parse manifest JSON, dropping invalid and duplicate entries
///
/// Only a document that is not a manifest at all is an error; an entry with
/// an undecodable field is skipped like any other invalid entry.
pub fn parse_manifest(json: &str) -> ManifestResult<(ManifestSource, ManifestStats)> {
    let raw: RawManifest = serde_json::from_str(json)?;
    let mut stats = ManifestStats {
        entries_processed: raw.files.len(),
        ..ManifestStats::default()
    };

    let mut seen = HashSet::new();
    let mut files = Vec::with_capacity(raw.files.len());
    for value in raw.files {
        let uri = value
            .get("uri")
            .and_then(Value::as_str)
            .unwrap_or("<no uri>")
            .to_string();

        let entry = match serde_json::from_value::<ManifestEntry>(value) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping entry {} in manifest {}: {}", uri, raw.name, e);
                stats.invalid_entries += 1;
                continue;
            }
        };
        if let Err(e) = entry.validate() {
            warn!("Skipping entry in manifest {}: {}", raw.name, e);
            stats.invalid_entries += 1;
            continue;
        }
        if !seen.insert(entry.uri.clone()) {
            debug!("Duplicate entry {} in manifest {}", entry.uri, raw.name);
            stats.duplicate_entries += 1;
            continue;
        }
        files.push(entry);
    }
    stats.valid_entries = files.len();

    let source = ManifestSource {
        name: raw.name,
        base_url: raw.base_url,
        files,
    };
    Ok((source, stats))
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> ManifestResult<(ManifestSource, ManifestStats)> {
    if !path.exists() {
        return Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let json = fs::read_to_string(path)?;
    let (source, stats) = parse_manifest(&json)?;

    info!(
        "Loaded manifest {} from {}: {} entries ({} skipped)",
        source.name,
        path.display(),
        stats.valid_entries,
        stats.total_skipped()
    );
    Ok((source, stats))
}
