//! Records of the block container: block header, block payload, and the
//! bounding box of the leading metadata block

use std::io::Read;

use flate2::read::ZlibDecoder;

use super::wire::FieldReader;
use crate::app::bounding_box::{BoundingBox, Position};
use crate::constants::pbf::{COORDINATE_RESOLUTION, MAX_BLOCK_SIZE};
use crate::errors::{PbfError, PbfResult};

/// Header record preceding every payload block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockHeader {
    pub block_type: String,
    pub data_size: usize,
}

impl BlockHeader {
    pub fn decode(buffer: &[u8]) -> PbfResult<Self> {
        let mut block_type = None;
        let mut data_size = None;

        let mut fields = FieldReader::new(buffer);
        while let Some((field, value)) = fields.next_field()? {
            match field {
                1 => {
                    let bytes = value.as_bytes()?;
                    let name = std::str::from_utf8(bytes)
                        .map_err(|_| PbfError::malformed("block type is not UTF-8"))?;
                    block_type = Some(name.to_string());
                }
                3 => {
                    // int32 on the wire, negative values sign-extend to ten bytes
                    let size = value.as_varint()? as i64;
                    let size = usize::try_from(size).map_err(|_| {
                        PbfError::malformed(format!("negative block size {}", size))
                    })?;
                    data_size = Some(size);
                }
                _ => {}
            }
        }

        Ok(Self {
            block_type: block_type.ok_or_else(|| PbfError::malformed("block header without type"))?,
            data_size: data_size.ok_or_else(|| PbfError::malformed("block header without size"))?,
        })
    }
}

/// Payload of a block, either stored raw or zlib-compressed
#[derive(Debug, Clone, PartialEq)]
pub enum BlockPayload<'a> {
    Raw(&'a [u8]),
    Zlib { data: &'a [u8], raw_size: Option<usize> },
    Unsupported { field: u32 },
}

impl<'a> BlockPayload<'a> {
    pub fn decode(buffer: &'a [u8]) -> PbfResult<Self> {
        let mut raw_size = None;
        let mut payload = None;

        let mut fields = FieldReader::new(buffer);
        while let Some((field, value)) = fields.next_field()? {
            match field {
                1 => payload = Some(BlockPayload::Raw(value.as_bytes()?)),
                2 => raw_size = usize::try_from(value.as_varint()?).ok(),
                3 => {
                    payload = Some(BlockPayload::Zlib {
                        data: value.as_bytes()?,
                        raw_size: None,
                    })
                }
                4..=7 => payload = Some(BlockPayload::Unsupported { field }),
                _ => {}
            }
        }

        match payload {
            Some(BlockPayload::Zlib { data, .. }) => Ok(BlockPayload::Zlib { data, raw_size }),
            Some(payload) => Ok(payload),
            None => Err(PbfError::malformed("block without payload")),
        }
    }

    /// Uncompressed payload bytes
    pub fn into_data(self) -> PbfResult<Vec<u8>> {
        match self {
            BlockPayload::Raw(data) => Ok(data.to_vec()),
            BlockPayload::Zlib { data, raw_size } => {
                let mut inflated = Vec::with_capacity(raw_size.unwrap_or(0).min(MAX_BLOCK_SIZE));
                ZlibDecoder::new(data)
                    .take(MAX_BLOCK_SIZE as u64 + 1)
                    .read_to_end(&mut inflated)
                    .map_err(|e| PbfError::malformed(format!("zlib payload: {}", e)))?;
                if inflated.len() > MAX_BLOCK_SIZE {
                    return Err(PbfError::malformed("inflated block exceeds size limit"));
                }
                Ok(inflated)
            }
            BlockPayload::Unsupported { field } => Err(PbfError::malformed(format!(
                "unsupported block compression (field {})",
                field
            ))),
        }
    }
}

/// Decode the optional bounding box of a metadata block
pub fn decode_header_bounding_box(buffer: &[u8]) -> PbfResult<Option<BoundingBox>> {
    let mut fields = FieldReader::new(buffer);
    while let Some((field, value)) = fields.next_field()? {
        if field == 1 {
            return decode_bbox(value.as_bytes()?).map(Some);
        }
    }
    Ok(None)
}

fn decode_bbox(buffer: &[u8]) -> PbfResult<BoundingBox> {
    let (mut left, mut right, mut top, mut bottom) = (None, None, None, None);

    let mut fields = FieldReader::new(buffer);
    while let Some((field, value)) = fields.next_field()? {
        match field {
            1 => left = Some(value.as_sint64()?),
            2 => right = Some(value.as_sint64()?),
            3 => top = Some(value.as_sint64()?),
            4 => bottom = Some(value.as_sint64()?),
            _ => {}
        }
    }

    match (left, right, top, bottom) {
        (Some(left), Some(right), Some(top), Some(bottom)) => Ok(BoundingBox::new(
            Position::new(as_coordinate(right), as_coordinate(top)),
            Position::new(as_coordinate(left), as_coordinate(bottom)),
        )),
        _ => Err(PbfError::malformed("bounding box lacks a coordinate")),
    }
}

fn as_coordinate(nanodegrees: i64) -> f64 {
    nanodegrees as f64 / COORDINATE_RESOLUTION
}

#[cfg(test)]
mod tests {
    use super::super::wire::encode;
    use super::*;

    #[test]
    fn test_block_header() {
        let mut buffer = Vec::new();
        encode::bytes_field(1, b"OSMData", &mut buffer);
        encode::bytes_field(2, b"index", &mut buffer);
        encode::varint_field(3, 1234, &mut buffer);

        let header = BlockHeader::decode(&buffer).unwrap();
        assert_eq!(header.block_type, "OSMData");
        assert_eq!(header.data_size, 1234);
    }

    #[test]
    fn test_block_header_requires_type_and_size() {
        let mut buffer = Vec::new();
        encode::varint_field(3, 10, &mut buffer);
        assert!(BlockHeader::decode(&buffer).is_err());

        let mut buffer = Vec::new();
        encode::bytes_field(1, b"OSMHeader", &mut buffer);
        assert!(BlockHeader::decode(&buffer).is_err());
    }

    #[test]
    fn test_negative_block_size_is_malformed() {
        let mut buffer = Vec::new();
        encode::bytes_field(1, b"OSMHeader", &mut buffer);
        encode::varint_field(3, -5i64 as u64, &mut buffer);
        let error = BlockHeader::decode(&buffer).unwrap_err();
        assert!(error.to_string().contains("negative block size"));
    }

    #[test]
    fn test_unsupported_compression() {
        let mut buffer = Vec::new();
        encode::varint_field(2, 100, &mut buffer);
        encode::bytes_field(4, b"lzma", &mut buffer);

        let payload = BlockPayload::decode(&buffer).unwrap();
        assert_eq!(payload, BlockPayload::Unsupported { field: 4 });
        assert!(payload.into_data().is_err());
    }

    #[test]
    fn test_corrupt_zlib_payload() {
        let mut buffer = Vec::new();
        encode::bytes_field(3, b"definitely not zlib", &mut buffer);

        let payload = BlockPayload::decode(&buffer).unwrap();
        assert!(matches!(
            payload.into_data(),
            Err(PbfError::Malformed { .. })
        ));
    }

    #[test]
    fn test_header_without_bounding_box() {
        let mut buffer = Vec::new();
        encode::bytes_field(4, b"OsmSchema-V0.6", &mut buffer);
        assert_eq!(decode_header_bounding_box(&buffer).unwrap(), None);
    }

    #[test]
    fn test_negative_coordinates() {
        let mut bbox = Vec::new();
        encode::varint_field(1, encode::zigzag(-10_500_000_000), &mut bbox);
        encode::varint_field(2, encode::zigzag(20_000_000_000), &mut bbox);
        encode::varint_field(3, encode::zigzag(60_000_000_000), &mut bbox);
        encode::varint_field(4, encode::zigzag(-33_250_000_000), &mut bbox);
        let mut header = Vec::new();
        encode::bytes_field(1, &bbox, &mut header);

        let bbox = decode_header_bounding_box(&header).unwrap().unwrap();
        assert_eq!(bbox.north_east, Position::new(20.0, 60.0));
        assert_eq!(bbox.south_west, Position::new(-10.5, -33.25));
    }
}
