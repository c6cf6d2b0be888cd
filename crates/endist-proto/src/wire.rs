//! # Wire Primitives
//!
//! The length-delimited binary framing the envelope is built from:
//! base-128 varints and `tag | length | bytes` blobs, matching the
//! protocol-buffer encoding deployed clients already parse. Only wire
//! type 2 (length-delimited) exists in the envelope schema, so that is
//! the only wire type this module can read.
//!
//! ## Varints
//!
//! Little-endian base-128 with a continuation bit: each byte carries 7
//! value bits, the high bit marks "more bytes follow". A `u64` needs at
//! most 10 bytes; the 10th may only contribute the single remaining bit.
//! Unterminated and overlong forms are rejected, never silently
//! truncated.

use crate::error::DecodeError;

/// Wire type of a length-delimited blob.
pub(crate) const WIRE_TYPE_LEN: u8 = 2;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Appends `value` as a base-128 varint.
pub(crate) fn put_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Appends a length-delimited field: tag, length, then the bytes.
pub(crate) fn put_blob(field: u64, bytes: &[u8], out: &mut Vec<u8>) {
    put_varint(field << 3 | u64::from(WIRE_TYPE_LEN), out);
    put_varint(bytes.len() as u64, out);
    out.extend_from_slice(bytes);
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Cursor over a serialized envelope.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Reads one varint.
    pub(crate) fn varint(&mut self) -> Result<u64, DecodeError> {
        let start = self.pos;
        let mut value: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = *self
                .buf
                .get(self.pos)
                .ok_or(DecodeError::Truncated { offset: start })?;
            self.pos += 1;
            // The 10th byte holds bit 63 alone; anything larger cannot
            // fit in a u64.
            if shift == 63 && (byte & 0x7f) > 1 {
                return Err(DecodeError::VarintOverflow { offset: start });
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 63 {
                return Err(DecodeError::VarintOverflow { offset: start });
            }
        }
    }

    /// Reads one field tag, split into field number and wire type.
    pub(crate) fn tag(&mut self) -> Result<(u64, u8), DecodeError> {
        let offset = self.pos;
        let raw = self.varint()?;
        let field = raw >> 3;
        let wire_type = (raw & 0x7) as u8;
        if field == 0 {
            return Err(DecodeError::InvalidTag { offset });
        }
        Ok((field, wire_type))
    }

    /// Reads one length-delimited blob body (the length plus that many
    /// bytes).
    pub(crate) fn blob(&mut self) -> Result<&'a [u8], DecodeError> {
        let offset = self.pos;
        let len = self.varint()?;
        let over = DecodeError::LengthOverrun { len, remaining: self.remaining(), offset };
        let len = usize::try_from(len).map_err(|_| over.clone())?;
        if len > self.remaining() {
            return Err(over);
        }
        let blob = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(blob)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
