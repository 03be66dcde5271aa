//! Local dataset discovery
//!
//! Recursive walk of the data root collecting raw extracts and directories
//! holding the extracted-form marker.

use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::app::descriptor::DatasetDescriptor;
use crate::constants::files::{DOT_PBF, EXTRACTED_MARKER};
use crate::errors::{CatalogError, CatalogResult};

/// Files and directories found below a data root
#[derive(Debug, Default)]
pub struct LocalScan {
    pub raw_extracts: Vec<PathBuf>,
    pub extracted_directories: Vec<PathBuf>,
}

/// Walk `root` recursively
///
/// Unreadable subdirectories are skipped; an unreadable root is an error.
pub fn walk_data_root(root: &Path) -> CatalogResult<LocalScan> {
    if !root.is_dir() {
        return Err(CatalogError::DirectoryNotAccessible {
            path: root.to_path_buf(),
        });
    }

    let mut scan = LocalScan::default();
    walk_directory(root, &mut scan, true)?;
    Ok(scan)
}

fn walk_directory(dir: &Path, scan: &mut LocalScan, is_root: bool) -> CatalogResult<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if !is_root => {
            debug!("Skipping unreadable directory {}: {}", dir.display(), e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        // symlinked directories are not followed
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            walk_directory(&path, scan, false)?;
        } else if entry.file_name() == EXTRACTED_MARKER {
            scan.extracted_directories.push(dir.to_path_buf());
        } else if path.to_string_lossy().ends_with(DOT_PBF) {
            scan.raw_extracts.push(path);
        }
    }

    Ok(())
}

/// Scan `root` and return its descriptors in local order
pub fn scan_local(root: &Path) -> CatalogResult<Vec<DatasetDescriptor>> {
    let scan = walk_data_root(root)?;

    let mut descriptors: Vec<DatasetDescriptor> = scan
        .extracted_directories
        .into_iter()
        .map(|dir| DatasetDescriptor::local_directory(root, dir))
        .chain(
            scan.raw_extracts
                .into_iter()
                .map(|file| DatasetDescriptor::local_raw_extract(root, file)),
        )
        .collect();

    sort_local(&mut descriptors);
    Ok(descriptors)
}

/// Directories before raw extracts, extracted ones first, then by name
pub fn sort_local(descriptors: &mut [DatasetDescriptor]) {
    descriptors.sort_by_cached_key(|descriptor| {
        (
            Reverse(descriptor.kind().local_rank()),
            Reverse(descriptor.has_extracted_form()),
            descriptor.name().to_string(),
        )
    });
}
