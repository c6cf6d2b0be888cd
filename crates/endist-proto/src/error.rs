//! Decode errors for the envelope wire format.
//!
//! Every variant carries the byte offset the decoder was at, so a
//! rejected artifact can be diagnosed from the error alone.

/// Error raised while decoding a serialized envelope.
///
/// Encoding is infallible; only decoding can reject input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The input ended in the middle of a varint or a length-delimited
    /// blob.
    #[error("input ends inside a field at offset {offset}")]
    Truncated { offset: usize },

    /// A varint ran past 10 bytes or encoded a value above `u64::MAX`.
    #[error("varint at offset {offset} does not fit in 64 bits")]
    VarintOverflow { offset: usize },

    /// A tag with field number zero, which no schema defines.
    #[error("invalid field tag at offset {offset}")]
    InvalidTag { offset: usize },

    /// A known field carried a wire type other than length-delimited.
    #[error("field {field} at offset {offset} has wire type {wire_type}, expected length-delimited")]
    WrongWireType { field: u64, wire_type: u8, offset: usize },

    /// A field number outside the envelope schema.
    #[error("unknown field {field} at offset {offset}")]
    UnknownField { field: u64, offset: usize },

    /// A schema field encoded more than once.
    #[error("field {field} repeated at offset {offset}")]
    DuplicateField { field: u64, offset: usize },

    /// A blob length larger than the bytes that follow it.
    #[error("length {len} at offset {offset} exceeds the {remaining} remaining bytes")]
    LengthOverrun { len: u64, remaining: usize, offset: usize },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
