//! Block stream scanning
//!
//! Walks `[4-byte big-endian length][header record][payload block]` frames
//! until the leading metadata block is found.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

use super::blocks::{decode_header_bounding_box, BlockHeader, BlockPayload};
use crate::app::bounding_box::BoundingBox;
use crate::constants::pbf::{MAX_BLOCK_SIZE, MAX_HEADER_SIZE, OSM_HEADER};
use crate::errors::{PbfError, PbfResult};

/// Scan a container for the bounding box of its metadata block
///
/// # Returns
///
/// * `Ok(Some(bbox))` - the metadata block carries a bounding box
/// * `Ok(None)` - the metadata block has no box, or the stream ended before one appeared
/// * `Err(PbfError::Truncated | PbfError::Malformed)` - the content is damaged
/// * `Err(PbfError::Io)` - the stream itself failed
pub fn read_header_bounding_box<R: Read>(mut reader: R) -> PbfResult<Option<BoundingBox>> {
    loop {
        let mut length = [0u8; 4];
        match read_up_to(&mut reader, &mut length)? {
            0 => return Ok(None),
            4 => {}
            got => return Err(PbfError::Truncated { wanted: 4, got }),
        }

        let header_length = u32::from_be_bytes(length) as usize;
        if header_length > MAX_HEADER_SIZE {
            return Err(PbfError::malformed(format!(
                "header record of {} bytes exceeds limit",
                header_length
            )));
        }

        let header_bytes = read_exactly(&mut reader, header_length)?;
        let header = BlockHeader::decode(&header_bytes)?;
        if header.data_size > MAX_BLOCK_SIZE {
            return Err(PbfError::malformed(format!(
                "block of {} bytes exceeds limit",
                header.data_size
            )));
        }

        if header.block_type != OSM_HEADER {
            skip_exactly(&mut reader, header.data_size)?;
            debug!(
                "Skipped block {} with {} bytes",
                header.block_type, header.data_size
            );
            continue;
        }

        let block_bytes = read_exactly(&mut reader, header.data_size)?;
        let data = BlockPayload::decode(&block_bytes)?.into_data()?;
        return decode_header_bounding_box(&data);
    }
}

/// Like [`read_header_bounding_box`], but damaged content degrades to `Ok(None)`
///
/// Truncated and corrupt extracts are common in the wild; only a failing
/// stream is reported as an error.
pub fn extract_bounding_box<R: Read>(reader: R) -> PbfResult<Option<BoundingBox>> {
    match read_header_bounding_box(reader) {
        Err(e) if e.is_content_error() => {
            warn!("Could not extract bounding box: {}", e);
            Ok(None)
        }
        other => other,
    }
}

/// Open a raw extract and extract its bounding box
pub fn extract_bounding_box_from_file(path: &Path) -> PbfResult<Option<BoundingBox>> {
    let file = File::open(path)?;
    let bbox = extract_bounding_box(BufReader::new(file))?;
    debug!("File {} has bounding box {:?}", path.display(), bbox);
    Ok(bbox)
}

/// Fill as much of `buffer` as the stream allows, returning the byte count
fn read_up_to<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_exactly<R: Read>(reader: &mut R, length: usize) -> PbfResult<Vec<u8>> {
    let mut buffer = vec![0u8; length];
    let got = read_up_to(reader, &mut buffer)?;
    if got != length {
        return Err(PbfError::Truncated {
            wanted: length,
            got,
        });
    }
    Ok(buffer)
}

fn skip_exactly<R: Read>(reader: &mut R, length: usize) -> PbfResult<()> {
    let skipped = io::copy(&mut reader.by_ref().take(length as u64), &mut io::sink())?;
    if skipped != length as u64 {
        return Err(PbfError::Truncated {
            wanted: length,
            got: skipped as usize,
        });
    }
    Ok(())
}
