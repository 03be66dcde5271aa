//! HTTP download orchestrator
//!
//! Streams the response into a temporary sibling of the target, verifies the
//! published size and checksum, then renames the file into place so that a
//! partially downloaded file never appears under the target name.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};
use url::Url;

use super::config::FetchConfig;
use super::request::FetchRequest;
use super::DownloadOrchestrator;
use crate::app::hash::Md5Hash;
use crate::constants::files::TEMP_FILE_SUFFIX;
use crate::errors::{FetchError, FetchResult};

/// Orchestrator downloading over HTTP with retries
#[derive(Debug, Clone)]
pub struct HttpOrchestrator {
    client: Client,
    config: FetchConfig,
}

impl HttpOrchestrator {
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        let client = config.build_http_client()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Target exists and matches the published checksum
    async fn is_already_verified(&self, request: &FetchRequest) -> bool {
        let expected = match request.checksum {
            Some(expected) if self.config.verify_checksums => expected,
            _ => return false,
        };
        if !request.target_path.exists() {
            return false;
        }

        match Md5Hash::of_file(&request.target_path).await {
            Ok(actual) => actual == expected,
            Err(e) => {
                warn!(
                    "Could not hash existing {}: {}",
                    request.target_path.display(),
                    e
                );
                false
            }
        }
    }

    async fn fetch_attempt(
        &self,
        url: &Url,
        temp_path: &Path,
        request: &FetchRequest,
    ) -> FetchResult<()> {
        let mut response = self.client.get(url.as_str()).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::ServerError {
                status: response.status().as_u16(),
            });
        }

        let mut file = File::create(temp_path).await?;
        let mut context = md5::Context::new();
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            context.consume(&chunk);
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        if let Some(expected) = request.expected_size {
            if expected != written {
                return Err(FetchError::SizeMismatch {
                    expected,
                    actual: written,
                });
            }
        }

        if self.config.verify_checksums {
            if let Some(expected) = request.checksum {
                let actual = Md5Hash::from_context(context);
                if actual != expected {
                    return Err(FetchError::HashMismatch {
                        expected: expected.to_hex(),
                        actual: actual.to_hex(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl DownloadOrchestrator for HttpOrchestrator {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<()> {
        let url = Url::parse(&request.source_uri).map_err(|e| FetchError::InvalidUrl {
            url: request.source_uri.clone(),
            error: e.to_string(),
        })?;

        let destination = &request.target_path;
        if self.is_already_verified(request).await {
            info!(
                "{} already present with matching checksum, skipping download",
                destination.display()
            );
            return Ok(());
        }
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp_path = temp_path_for(destination);

        let mut retries = 0;
        loop {
            match self.fetch_attempt(&url, &temp_path, request).await {
                Ok(()) => {
                    tokio::fs::rename(&temp_path, destination)
                        .await
                        .map_err(|_| FetchError::AtomicOperationFailed {
                            temp_path: temp_path.clone(),
                            final_path: destination.clone(),
                        })?;
                    info!("Downloaded {} to {}", url, destination.display());
                    return Ok(());
                }
                Err(e) if retries < self.config.max_retries => {
                    retries += 1;
                    let delay = self.config.retry_delay(retries);
                    warn!(
                        "Download failed (attempt {}/{}): {}. Retrying in {}ms",
                        retries,
                        self.config.max_retries,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    if temp_path.exists() {
                        let _ = tokio::fs::remove_file(&temp_path).await;
                    }
                    if retries == 0 {
                        return Err(e);
                    }
                    error!("Download failed after {} retries: {}", retries, e);
                    return Err(FetchError::MaxRetriesExceeded {
                        max_retries: retries,
                        last_error: e.to_string(),
                    });
                }
            }
        }
    }
}

/// Temporary sibling of `destination` (`germany.zip` -> `germany.zip.tmp`)
pub fn temp_path_for(destination: &Path) -> PathBuf {
    let mut file_name = destination
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    file_name.push(TEMP_FILE_SUFFIX);
    destination.with_file_name(file_name)
}
