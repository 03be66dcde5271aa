//! Making a selected dataset available on disk
//!
//! The catalog never downloads by itself. When a selection requires a fetch,
//! a [`FetchRequest`] is handed to a [`DownloadOrchestrator`] and the caller
//! waits for it to finish. Timeouts, retries and cancellation belong to the
//! orchestrator; afterwards the target path is checked once and a missing
//! file is reported, not retried.
//!
//! # Module Organization
//!
//! - [`request`] - FetchRequest built from a remote descriptor
//! - [`config`] - FetchConfig for the bundled orchestrator
//! - [`http`] - HttpOrchestrator streaming downloads with reqwest
//!
//! # Examples
//!
//! ```rust,no_run
//! use geodata_catalog::app::bounding_box::BoundingBox;
//! use geodata_catalog::app::catalog::{Catalog, CatalogConfig};
//! use geodata_catalog::app::fetch::{ensure_available, FetchConfig, HttpOrchestrator};
//! use geodata_catalog::app::selector::CoverageSelector;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::build(CatalogConfig::new("/var/lib/graphs"))?;
//! let target = BoundingBox::from_coordinates(10.1, 53.7, 9.9, 53.5);
//! let selection = CoverageSelector::new(&catalog).select(&target)?;
//!
//! let orchestrator = HttpOrchestrator::new(FetchConfig::default())?;
//! let path = ensure_available(&selection, &orchestrator).await?;
//! println!("ready at {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod http;
pub mod request;

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::app::descriptor::lookup_extracted_directory;
use crate::app::selector::Selection;
use crate::errors::{FetchError, FetchResult};

pub use config::FetchConfig;
pub use http::HttpOrchestrator;
pub use request::FetchRequest;

/// Brings remote files to disk
///
/// `fetch` resolves once the orchestrator considers the request complete.
#[async_trait]
pub trait DownloadOrchestrator: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<()>;
}

/// Local path of the selected dataset, fetching it first when required
///
/// # Errors
///
/// Propagates orchestrator failures unchanged and returns
/// `FetchError::TargetMissing` when the orchestrator reports success but the
/// target path does not exist.
pub async fn ensure_available<O>(selection: &Selection<'_>, orchestrator: &O) -> FetchResult<PathBuf>
where
    O: DownloadOrchestrator + ?Sized,
{
    let descriptor = selection.descriptor;

    if !selection.requires_fetch {
        let path = descriptor
            .local_path()
            .ok_or_else(|| FetchError::NotRemote {
                name: descriptor.name().to_string(),
            })?;
        // a remote archive may only be present in its extracted form
        if !path.exists() && descriptor.has_extracted_form() {
            return Ok(lookup_extracted_directory(path));
        }
        return Ok(path.to_path_buf());
    }

    let request = FetchRequest::for_descriptor(descriptor)?;
    info!(
        "Fetching {} to {}",
        request.source_uri,
        request.target_path.display()
    );
    orchestrator.fetch(&request).await?;

    if !request.target_path.exists() {
        return Err(FetchError::TargetMissing {
            path: request.target_path,
        });
    }

    info!("Dataset {} available", descriptor.name());
    Ok(request.target_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::bounding_box::BoundingBox;
    use crate::app::descriptor::{DatasetDescriptor, RemoteFile};
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Writes the target file and records every request
    #[derive(Default)]
    struct RecordingOrchestrator {
        requests: Mutex<Vec<FetchRequest>>,
    }

    #[async_trait]
    impl DownloadOrchestrator for RecordingOrchestrator {
        async fn fetch(&self, request: &FetchRequest) -> FetchResult<()> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(parent) = request.target_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&request.target_path, b"graph").await?;
            Ok(())
        }
    }

    /// Claims success without writing anything
    struct LyingOrchestrator;

    #[async_trait]
    impl DownloadOrchestrator for LyingOrchestrator {
        async fn fetch(&self, _request: &FetchRequest) -> FetchResult<()> {
            Ok(())
        }
    }

    struct FailingOrchestrator;

    #[async_trait]
    impl DownloadOrchestrator for FailingOrchestrator {
        async fn fetch(&self, request: &FetchRequest) -> FetchResult<()> {
            Err(FetchError::Orchestrator {
                uri: request.source_uri.clone(),
                reason: "mirror offline".to_string(),
            })
        }
    }

    fn remote_descriptor(data_root: &Path) -> DatasetDescriptor {
        DatasetDescriptor::from_remote(
            RemoteFile {
                source: "graphhopper".to_string(),
                base_url: "https://example.org/".to_string(),
                uri: "europe/germany.zip".to_string(),
                size: Some(5),
                checksum: None,
                timestamp: None,
                bounding_box: Some(BoundingBox::from_coordinates(15.0, 55.0, 5.0, 47.0)),
            },
            data_root,
        )
    }

    #[tokio::test]
    async fn test_fetches_when_required() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = remote_descriptor(temp_dir.path());
        let selection = Selection {
            descriptor: &descriptor,
            requires_fetch: true,
        };
        let orchestrator = RecordingOrchestrator::default();

        let path = ensure_available(&selection, &orchestrator).await.unwrap();
        assert_eq!(path, temp_dir.path().join("europe/germany.zip"));
        assert!(path.exists());

        let requests = orchestrator.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].source_uri, "https://example.org/europe/germany.zip");
        assert_eq!(requests[0].expected_size, Some(5));
    }

    #[tokio::test]
    async fn test_skips_fetch_when_present() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = remote_descriptor(temp_dir.path());
        let selection = Selection {
            descriptor: &descriptor,
            requires_fetch: false,
        };
        let orchestrator = RecordingOrchestrator::default();

        let path = ensure_available(&selection, &orchestrator).await.unwrap();
        assert_eq!(path, temp_dir.path().join("europe/germany.zip"));
        assert!(orchestrator.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extracted_form_is_returned() {
        let temp_dir = TempDir::new().unwrap();
        let extracted = temp_dir.path().join("europe/germany");
        std::fs::create_dir_all(&extracted).unwrap();
        std::fs::write(extracted.join("properties"), b"").unwrap();

        let descriptor = remote_descriptor(temp_dir.path());
        assert!(descriptor.exists_locally());
        let selection = Selection {
            descriptor: &descriptor,
            requires_fetch: false,
        };

        let path = ensure_available(&selection, &LyingOrchestrator).await.unwrap();
        assert_eq!(path, extracted);
    }

    #[tokio::test]
    async fn test_missing_target_after_fetch() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = remote_descriptor(temp_dir.path());
        let selection = Selection {
            descriptor: &descriptor,
            requires_fetch: true,
        };

        let result = ensure_available(&selection, &LyingOrchestrator).await;
        assert!(matches!(result, Err(FetchError::TargetMissing { .. })));
    }

    #[tokio::test]
    async fn test_orchestrator_failure_is_surfaced() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = remote_descriptor(temp_dir.path());
        let selection = Selection {
            descriptor: &descriptor,
            requires_fetch: true,
        };

        let orchestrator: Box<dyn DownloadOrchestrator> = Box::new(FailingOrchestrator);
        let result = ensure_available(&selection, orchestrator.as_ref()).await;
        assert!(matches!(result, Err(FetchError::Orchestrator { .. })));
    }
}
