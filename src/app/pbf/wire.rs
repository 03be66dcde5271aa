//! Minimal protocol buffer wire decoding
//!
//! Only what the container records need: varints, length-delimited fields and
//! skipping of fixed-width fields. Groups are rejected.

use crate::errors::{PbfError, PbfResult};

/// A decoded field value, borrowing length-delimited payloads from the buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Varint(u64),
    Fixed64(u64),
    Bytes(&'a [u8]),
    Fixed32(u32),
}

impl<'a> FieldValue<'a> {
    pub fn as_varint(&self) -> PbfResult<u64> {
        match self {
            FieldValue::Varint(value) => Ok(*value),
            other => Err(PbfError::malformed(format!(
                "expected varint field, found {:?}",
                other
            ))),
        }
    }

    pub fn as_bytes(&self) -> PbfResult<&'a [u8]> {
        match self {
            FieldValue::Bytes(bytes) => Ok(bytes),
            other => Err(PbfError::malformed(format!(
                "expected length-delimited field, found {:?}",
                other
            ))),
        }
    }

    /// Decode a `sint64` field
    pub fn as_sint64(&self) -> PbfResult<i64> {
        self.as_varint().map(zigzag_decode)
    }
}

/// Sequential reader over the fields of one encoded message
pub struct FieldReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Next `(field number, value)` pair, `None` at the end of the message
    pub fn next_field(&mut self) -> PbfResult<Option<(u32, FieldValue<'a>)>> {
        if self.position >= self.buffer.len() {
            return Ok(None);
        }

        let key = self.read_varint()?;
        let field_number = u32::try_from(key >> 3)
            .map_err(|_| PbfError::malformed(format!("field number out of range: {}", key >> 3)))?;

        let value = match key & 0x7 {
            0 => FieldValue::Varint(self.read_varint()?),
            1 => FieldValue::Fixed64(u64::from_le_bytes(self.take_array::<8>()?)),
            2 => {
                let length = usize::try_from(self.read_varint()?)
                    .map_err(|_| PbfError::malformed("length out of range"))?;
                FieldValue::Bytes(self.take(length)?)
            }
            5 => FieldValue::Fixed32(u32::from_le_bytes(self.take_array::<4>()?)),
            wire_type => {
                return Err(PbfError::malformed(format!(
                    "unsupported wire type {} for field {}",
                    wire_type, field_number
                )))
            }
        };

        Ok(Some((field_number, value)))
    }

    fn read_varint(&mut self) -> PbfResult<u64> {
        let mut value = 0u64;
        for shift in (0..64).step_by(7) {
            let byte = *self
                .buffer
                .get(self.position)
                .ok_or_else(|| PbfError::malformed("varint runs past end of record"))?;
            self.position += 1;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(PbfError::malformed("varint longer than 10 bytes"))
    }

    fn take(&mut self, length: usize) -> PbfResult<&'a [u8]> {
        let end = self
            .position
            .checked_add(length)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| {
                PbfError::malformed(format!(
                    "field of {} bytes runs past end of record",
                    length
                ))
            })?;
        let slice = &self.buffer[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> PbfResult<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }
}

pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
