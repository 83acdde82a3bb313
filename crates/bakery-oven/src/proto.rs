//! Just enough of the protobuf wire format for macaroon identifiers.
//!
//! Only length-delimited fields are written. Unknown fields of any wire type
//! are skipped when reading.

use crate::error::DecodeError;

pub(crate) const WIRE_VARINT: u8 = 0;
pub(crate) const WIRE_FIXED64: u8 = 1;
pub(crate) const WIRE_LEN: u8 = 2;
pub(crate) const WIRE_FIXED32: u8 = 5;

/// Append a base-128 varint.
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
pub(crate) fn put_varint(buf: &mut Vec<u8>, mut value: u64) {
    // Shifts are by a constant below the width; casts keep the low 7 bits.
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Append a length-delimited field. Empty values are omitted.
pub(crate) fn put_bytes_field(buf: &mut Vec<u8>, field: u64, value: &[u8]) {
    if value.is_empty() {
        return;
    }
    put_key(buf, field, WIRE_LEN);
    put_varint(buf, value.len() as u64);
    buf.extend_from_slice(value);
}

/// Append a length-delimited field even when empty (repeated elements).
pub(crate) fn put_repeated_field(buf: &mut Vec<u8>, field: u64, value: &[u8]) {
    put_key(buf, field, WIRE_LEN);
    put_varint(buf, value.len() as u64);
    buf.extend_from_slice(value);
}

#[allow(clippy::arithmetic_side_effects)]
fn put_key(buf: &mut Vec<u8>, field: u64, wire_type: u8) {
    // Field numbers used here are tiny; the shift cannot overflow.
    put_varint(buf, (field << 3) | u64::from(wire_type));
}

/// Cursor over an encoded message.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Read a field key as `(field number, wire type)`.
    pub(crate) fn read_key(&mut self) -> Result<(u64, u8), DecodeError> {
        let key = self.read_varint()?;
        let wire_type = u8::try_from(key & 0x7).map_err(|_| DecodeError::Malformed("bad key"))?;
        let field = key.checked_shr(3).unwrap_or(0);
        if field == 0 {
            return Err(DecodeError::Malformed("field number zero"));
        }
        Ok((field, wire_type))
    }

    pub(crate) fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let mut value = 0u64;
        for shift in (0..64u32).step_by(7) {
            let byte = self.read_byte()?;
            value |= u64::from(byte & 0x7f).checked_shl(shift).unwrap_or(0);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(DecodeError::Malformed("varint too long"))
    }

    pub(crate) fn read_len_delimited(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = usize::try_from(self.read_varint()?)
            .map_err(|_| DecodeError::Malformed("length out of range"))?;
        self.read_bytes(len)
    }

    /// Skip over the value of a field with the given wire type.
    pub(crate) fn skip(&mut self, wire_type: u8) -> Result<(), DecodeError> {
        match wire_type {
            WIRE_VARINT => self.read_varint().map(drop),
            WIRE_FIXED64 => self.read_bytes(8).map(drop),
            WIRE_LEN => self.read_len_delimited().map(drop),
            WIRE_FIXED32 => self.read_bytes(4).map(drop),
            _ => Err(DecodeError::Malformed("unsupported wire type")),
        }
    }

    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let (&byte, rest) = self
            .buf
            .split_first()
            .ok_or(DecodeError::Malformed("truncated"))?;
        self.buf = rest;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let (head, rest) = self
            .buf
            .split_at_checked(len)
            .ok_or(DecodeError::Malformed("truncated"))?;
        self.buf = rest;
        Ok(head)
    }
}
