use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::descriptor::DatasetDescriptor;
use crate::app::hash::Md5Hash;
use crate::errors::{FetchError, FetchResult};

/// Everything an orchestrator needs to bring one remote file to disk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchRequest {
    /// Full download URL
    pub source_uri: String,
    pub expected_size: Option<u64>,
    pub checksum: Option<Md5Hash>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Where the file must exist once the fetch completes
    pub target_path: PathBuf,
}

impl FetchRequest {
    /// Request for a remote descriptor
    ///
    /// # Errors
    ///
    /// Returns `FetchError::NotRemote` for descriptors without a remote reference.
    pub fn for_descriptor(descriptor: &DatasetDescriptor) -> FetchResult<Self> {
        let not_remote = || FetchError::NotRemote {
            name: descriptor.name().to_string(),
        };
        let remote = descriptor.remote().ok_or_else(not_remote)?;
        let target_path = descriptor.local_path().ok_or_else(not_remote)?;

        Ok(Self {
            source_uri: remote.url(),
            expected_size: remote.size,
            checksum: remote.checksum,
            timestamp: remote.timestamp,
            target_path: target_path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::descriptor::RemoteFile;
    use std::path::Path;

    #[test]
    fn test_request_for_remote_descriptor() {
        let checksum = Md5Hash::from_hex("d41d8cd98f00b204e9800998ecf8427e").unwrap();
        let descriptor = DatasetDescriptor::from_remote(
            RemoteFile {
                source: "graphhopper".to_string(),
                base_url: "https://example.org/graphs/".to_string(),
                uri: "europe/germany.zip".to_string(),
                size: Some(42),
                checksum: Some(checksum),
                timestamp: None,
                bounding_box: None,
            },
            Path::new("/data"),
        );

        let request = FetchRequest::for_descriptor(&descriptor).unwrap();
        assert_eq!(
            request.source_uri,
            "https://example.org/graphs/europe/germany.zip"
        );
        assert_eq!(request.expected_size, Some(42));
        assert_eq!(request.checksum, Some(checksum));
        assert_eq!(request.target_path, Path::new("/data/europe/germany.zip"));
    }

    #[test]
    fn test_local_descriptor_is_not_fetchable() {
        let descriptor =
            DatasetDescriptor::local_directory(Path::new("/data"), PathBuf::from("/data/germany"));
        assert!(matches!(
            FetchRequest::for_descriptor(&descriptor),
            Err(FetchError::NotRemote { .. })
        ));
    }
}
