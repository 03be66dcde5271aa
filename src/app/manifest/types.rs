//! Core types for manifest processing

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::bounding_box::BoundingBox;
use crate::app::descriptor::RemoteFile;
use crate::app::hash::Md5Hash;
use crate::errors::{ManifestError, ManifestResult};

/// One published source: a base URL and the files available below it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestSource {
    /// Source name, used in logs and as the default for remote references
    pub name: String,
    /// URL every entry URI is relative to
    pub base_url: String,
    #[serde(default)]
    pub files: Vec<ManifestEntry>,
}

impl ManifestSource {
    /// Convert entries into remote references, optionally under another base URL
    pub fn into_remote_files(self, base_url_override: Option<&str>) -> Vec<RemoteFile> {
        let base_url = base_url_override
            .map(str::to_string)
            .unwrap_or(self.base_url);
        let source = self.name;

        self.files
            .into_iter()
            .map(|entry| RemoteFile {
                source: source.clone(),
                base_url: base_url.clone(),
                uri: entry.uri,
                size: entry.size,
                checksum: entry.checksum,
                timestamp: entry.timestamp,
                bounding_box: entry.bounding_box,
            })
            .collect()
    }
}

/// A single published file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the base URL, reused as the path below the data root
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Md5Hash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl ManifestEntry {
    /// Reject URIs that could not safely become a path below the data root
    pub fn validate(&self) -> ManifestResult<()> {
        let uri = self.uri.trim();
        if uri.is_empty() {
            return Err(ManifestError::InvalidPath {
                path: self.uri.clone(),
            });
        }
        if uri.starts_with('/') || uri.contains('\\') || Path::new(uri).is_absolute() {
            return Err(ManifestError::InvalidPath {
                path: self.uri.clone(),
            });
        }
        if uri.split('/').any(|segment| segment == "..") {
            return Err(ManifestError::InvalidPath {
                path: self.uri.clone(),
            });
        }
        if uri.ends_with('/') {
            return Err(ManifestError::InvalidEntry {
                uri: self.uri.clone(),
                reason: "uri names a directory".to_string(),
            });
        }
        Ok(())
    }
}

/// Statistics about manifest processing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestStats {
    /// Entries found in the manifest
    pub entries_processed: usize,
    /// Entries accepted
    pub valid_entries: usize,
    /// Entries rejected by validation
    pub invalid_entries: usize,
    /// Repeated URIs, first occurrence wins
    pub duplicate_entries: usize,
}

impl ManifestStats {
    /// Calculate success rate as percentage
    pub fn success_rate(&self) -> f64 {
        if self.entries_processed == 0 {
            0.0
        } else {
            (self.valid_entries as f64 / self.entries_processed as f64) * 100.0
        }
    }

    pub fn total_skipped(&self) -> usize {
        self.invalid_entries + self.duplicate_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(uri: &str) -> ManifestEntry {
        ManifestEntry {
            uri: uri.to_string(),
            size: None,
            checksum: None,
            timestamp: None,
            bounding_box: None,
        }
    }

    #[test]
    fn test_entry_validation() {
        assert!(entry("europe/germany.zip").validate().is_ok());
        assert!(entry("germany-latest.osm.pbf").validate().is_ok());

        assert!(entry("").validate().is_err());
        assert!(entry("   ").validate().is_err());
        assert!(entry("/etc/passwd").validate().is_err());
        assert!(entry("../outside.zip").validate().is_err());
        assert!(entry("europe/../../outside.zip").validate().is_err());
        assert!(entry("europe\\germany.zip").validate().is_err());
        assert!(entry("europe/").validate().is_err());
    }

    #[test]
    fn test_into_remote_files_with_override() {
        let source = ManifestSource {
            name: "graphhopper".to_string(),
            base_url: "https://example.org/".to_string(),
            files: vec![entry("germany.zip"), entry("france.zip")],
        };

        let files = source.clone().into_remote_files(None);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].base_url, "https://example.org/");
        assert_eq!(files[1].source, "graphhopper");

        let files = source.into_remote_files(Some("https://mirror.example.org/"));
        assert_eq!(files[0].url(), "https://mirror.example.org/germany.zip");
    }

    #[test]
    fn test_manifest_stats() {
        let stats = ManifestStats {
            entries_processed: 10,
            valid_entries: 7,
            invalid_entries: 2,
            duplicate_entries: 1,
        };
        assert_eq!(stats.success_rate(), 70.0);
        assert_eq!(stats.total_skipped(), 3);
        assert_eq!(ManifestStats::default().success_rate(), 0.0);
    }
}
