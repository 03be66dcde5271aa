//! Binary block container reading
//!
//! Raw extracts are a stream of length-prefixed frames, each a header record
//! followed by an optionally zlib-compressed payload block. Only the leading
//! metadata block is decoded, and only far enough to recover its bounding box,
//! so no general purpose protocol buffer stack is needed.
//!
//! # Module Organization
//!
//! - [`wire`] - varint and length-delimited field decoding
//! - [`blocks`] - header record, payload block and bounding box decoding
//! - [`reader`] - the frame loop and file entry points
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use geodata_catalog::app::pbf::extract_bounding_box_from_file;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! if let Some(bbox) = extract_bounding_box_from_file(Path::new("germany-latest.osm.pbf"))? {
//!     println!("covers {}", bbox);
//! }
//! # Ok(())
//! # }
//! ```

pub mod blocks;
pub mod reader;
pub mod wire;

pub use blocks::{BlockHeader, BlockPayload};
pub use reader::{extract_bounding_box, extract_bounding_box_from_file, read_header_bounding_box};
