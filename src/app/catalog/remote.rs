//! Remote manifest ingestion

use std::cmp::Ordering;
use std::path::Path;

use tracing::{debug, warn};

use super::config::SourceConfig;
use crate::app::descriptor::DatasetDescriptor;
use crate::app::manifest::load_manifest;

/// Area of a bounding box, totally ordered
#[derive(Debug, Clone, Copy)]
struct Area(f64);

impl PartialEq for Area {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Area {}

impl PartialOrd for Area {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Area {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Archives before raw extracts, boxed before unboxed, smaller boxes first, then URI
fn remote_sort_key(descriptor: &DatasetDescriptor) -> (u8, bool, Area, String) {
    let bbox = descriptor.bounding_box();
    (
        descriptor.kind().remote_rank(),
        bbox.is_none(),
        Area(bbox.map_or(0.0, |b| b.square_size())),
        descriptor
            .remote()
            .map(|remote| remote.uri.clone())
            .unwrap_or_default(),
    )
}

pub fn sort_remote(descriptors: &mut [DatasetDescriptor]) {
    descriptors.sort_by_cached_key(remote_sort_key);
}

/// Load every configured manifest and return their entries in remote order
///
/// A source whose manifest cannot be loaded is logged and contributes nothing.
pub fn ingest_remote(sources: &[SourceConfig], data_root: &Path) -> Vec<DatasetDescriptor> {
    let mut descriptors = Vec::new();

    for source in sources {
        let manifest = match load_manifest(&source.manifest) {
            Ok((manifest, _)) => manifest,
            Err(e) => {
                warn!("Skipping remote source {}: {}", source.name, e);
                continue;
            }
        };

        let files = manifest.into_remote_files(source.base_url.as_deref());
        debug!("Source {} contributed {} files", source.name, files.len());
        descriptors.extend(
            files
                .into_iter()
                .map(|file| DatasetDescriptor::from_remote(file, data_root)),
        );
    }

    sort_remote(&mut descriptors);
    descriptors
}
