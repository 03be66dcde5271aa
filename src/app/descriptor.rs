//! Dataset descriptors
//!
//! A descriptor identifies one candidate dataset: an extracted directory or a
//! raw extract on disk, or an archive or raw extract published in a remote
//! manifest. Bounding boxes of local raw extracts are decoded lazily, at most
//! once per descriptor.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::bounding_box::BoundingBox;
use crate::app::hash::Md5Hash;
use crate::app::pbf::extract_bounding_box_from_file;
use crate::constants::files::{DOT_PBF, EXTRACTED_MARKER, KNOWN_EXTENSIONS, LATEST_SUFFIX};
use crate::errors::PbfResult;

/// The four shapes a dataset can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetKind {
    /// Already extracted directory on disk
    LocalDirectory,
    /// Raw extract on disk
    LocalRawExtract,
    /// Pre-extracted archive published remotely
    RemoteArchive,
    /// Raw extract published remotely
    RemoteRawExtract,
}

impl DatasetKind {
    pub fn is_local(&self) -> bool {
        matches!(self, DatasetKind::LocalDirectory | DatasetKind::LocalRawExtract)
    }

    /// Rank for local ordering, higher first: directories, raw extracts, archives
    pub fn local_rank(&self) -> u8 {
        match self {
            DatasetKind::LocalDirectory => 2,
            DatasetKind::LocalRawExtract | DatasetKind::RemoteRawExtract => 1,
            DatasetKind::RemoteArchive => 0,
        }
    }

    /// Rank for remote ordering, lower first: archives before raw extracts
    pub fn remote_rank(&self) -> u8 {
        match self {
            DatasetKind::RemoteArchive => 0,
            DatasetKind::RemoteRawExtract | DatasetKind::LocalRawExtract => 1,
            DatasetKind::LocalDirectory => 2,
        }
    }
}

/// Remote reference of a dataset as published in a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Name of the manifest source the file was published in
    pub source: String,
    /// Base URL the URI is relative to
    pub base_url: String,
    /// Path of the file relative to the base URL and to the local data root
    pub uri: String,
    pub size: Option<u64>,
    pub checksum: Option<Md5Hash>,
    pub timestamp: Option<DateTime<Utc>>,
    pub bounding_box: Option<BoundingBox>,
}

impl RemoteFile {
    /// Full download URL: base URL and URI concatenated
    pub fn url(&self) -> String {
        if self.base_url.is_empty() || self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, self.uri)
        } else {
            format!("{}/{}", self.base_url, self.uri)
        }
    }
}

/// A candidate dataset, local or remote
#[derive(Debug, Clone)]
pub struct DatasetDescriptor {
    kind: DatasetKind,
    name: String,
    local_path: Option<PathBuf>,
    remote: Option<RemoteFile>,
    bounding_box: OnceLock<Option<BoundingBox>>,
}

impl DatasetDescriptor {
    /// Descriptor for an extracted directory below `root`
    pub fn local_directory(root: &Path, directory: PathBuf) -> Self {
        Self {
            kind: DatasetKind::LocalDirectory,
            name: derive_name(root, &directory),
            local_path: Some(directory),
            remote: None,
            bounding_box: OnceLock::new(),
        }
    }

    /// Descriptor for a raw extract file below `root`
    pub fn local_raw_extract(root: &Path, file: PathBuf) -> Self {
        Self {
            kind: DatasetKind::LocalRawExtract,
            name: derive_name(root, &file),
            local_path: Some(file),
            remote: None,
            bounding_box: OnceLock::new(),
        }
    }

    /// Descriptor for a manifest entry that would be stored below `data_root`
    pub fn from_remote(file: RemoteFile, data_root: &Path) -> Self {
        let kind = if file.uri.ends_with(DOT_PBF) {
            DatasetKind::RemoteRawExtract
        } else {
            DatasetKind::RemoteArchive
        };

        Self {
            kind,
            name: strip_known_extensions(&file.uri).to_string(),
            local_path: Some(data_root.join(&file.uri)),
            remote: Some(file),
            bounding_box: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Derived identifier: relative path or URI without known extensions
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the dataset lives, or would live once fetched
    pub fn local_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }

    pub fn remote(&self) -> Option<&RemoteFile> {
        self.remote.as_ref()
    }

    /// Bounding box of the dataset, computed at most once
    ///
    /// Remote entries answer with their manifest box, directories never have
    /// one, and raw extracts on disk decode theirs from the file. A failed or
    /// empty decode is cached as well.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self.kind {
            DatasetKind::LocalDirectory => None,
            DatasetKind::RemoteArchive | DatasetKind::RemoteRawExtract => {
                self.remote.as_ref().and_then(|remote| remote.bounding_box)
            }
            DatasetKind::LocalRawExtract => {
                self.decoded_bounding_box(extract_bounding_box_from_file)
            }
        }
    }

    /// Memoized decode of a raw extract's box; concurrent callers wait for the first
    fn decoded_bounding_box<F>(&self, decode: F) -> Option<BoundingBox>
    where
        F: FnOnce(&Path) -> PbfResult<Option<BoundingBox>>,
    {
        *self.bounding_box.get_or_init(|| {
            let path = self.local_path.as_deref()?;
            match decode(path) {
                Ok(bbox) => bbox,
                Err(e) => {
                    warn!("Could not read bounding box of {}: {}", path.display(), e);
                    None
                }
            }
        })
    }

    /// Whether a ready-to-use extracted directory exists for this dataset
    pub fn has_extracted_form(&self) -> bool {
        match (self.kind, self.local_path.as_deref()) {
            (DatasetKind::LocalDirectory, _) => true,
            (_, Some(path)) => lookup_extracted_directory(path)
                .join(EXTRACTED_MARKER)
                .exists(),
            (_, None) => false,
        }
    }

    /// Whether the dataset can be used without fetching anything
    pub fn exists_locally(&self) -> bool {
        if self.kind.is_local() {
            return true;
        }
        self.local_path.as_deref().map_or(false, Path::exists) || self.has_extracted_form()
    }

    /// Exact match on the derived name, or after dropping one leading folder of the identifier
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let identifier = identifier.replace('\\', "/");
        let identifier = strip_known_extensions(identifier.trim_start_matches("./"));

        identifier == self.name
            || identifier
                .split_once('/')
                .map_or(false, |(_, rest)| rest == self.name)
    }

    /// Matches by identifier, or by a valid box containing the target
    pub fn matches(&self, identifier: Option<&str>, target: &BoundingBox) -> bool {
        if identifier.map_or(false, |id| self.matches_identifier(id)) {
            return true;
        }
        self.bounding_box()
            .map_or(false, |bbox| bbox.is_valid() && bbox.contains(target))
    }

    /// Boxes near the antimeridian are invalid; a missing box is valid but uninformative
    pub fn is_valid(&self) -> bool {
        self.bounding_box().map_or(true, |bbox| bbox.is_valid())
    }

    /// Present and usable for geometry decisions
    pub fn has_valid_bounding_box(&self) -> bool {
        self.bounding_box().map_or(false, |bbox| bbox.is_valid())
    }
}

impl PartialEq for DatasetDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.local_path == other.local_path
            && self.remote.as_ref().map(|r| &r.uri) == other.remote.as_ref().map(|r| &r.uri)
    }
}

impl fmt::Display for DatasetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.remote {
            Some(remote) => write!(f, "{:?} {} ({})", self.kind, self.name, remote.url()),
            None => write!(f, "{:?} {}", self.kind, self.name),
        }
    }
}

/// Strip every trailing known extension (`germany-latest.osm.pbf` -> `germany-latest`)
pub fn strip_known_extensions(name: &str) -> &str {
    let mut stripped = name;
    while let Some(shorter) = KNOWN_EXTENSIONS
        .iter()
        .find_map(|extension| stripped.strip_suffix(extension))
    {
        stripped = shorter;
    }
    stripped
}

/// Directory an extract is expected to be extracted into
///
/// `europe/germany-latest.osm.pbf` maps to `europe/germany-latest`, or to
/// `europe/germany` when the former does not exist.
pub fn lookup_extracted_directory(file: &Path) -> PathBuf {
    let parent = file.parent().unwrap_or_else(|| Path::new(""));
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = strip_known_extensions(&file_name);

    let directory = parent.join(stem);
    if directory.exists() {
        return directory;
    }
    match stem.strip_suffix(LATEST_SUFFIX) {
        Some(without_latest) => parent.join(without_latest),
        None => directory,
    }
}

/// Path relative to `root` with `/` separators and known extensions removed
fn derive_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let joined = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    strip_known_extensions(&joined).to_string()
}
