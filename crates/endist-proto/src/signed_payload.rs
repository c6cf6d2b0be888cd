//! # The Signed Envelope Record
//!
//! [`SignedPayload`] is the record persisted in place of a signed file's
//! raw content and parsed by every downstream client. Its serialized
//! form is the compatibility contract of the distribution: three
//! length-delimited byte fields with fixed field numbers.
//!
//! | Field | Number | Content                                   |
//! |-------|--------|-------------------------------------------|
//! | `payload`           | 1 | the protected bytes            |
//! | `certificate_chain` | 2 | DER-encoded certificate(s)     |
//! | `signature`         | 3 | raw 64-byte Ed25519 signature  |
//!
//! Fields are emitted in field-number order and empty fields are
//! omitted, so equal records always serialize to equal bytes. An absent
//! field decodes as empty. Decoding is strict: unknown fields, repeated
//! fields, non-length-delimited wire types, and malformed framing are
//! all rejected rather than skipped, so a tampered or corrupted artifact
//! cannot slip through as "mostly valid".

use std::fmt;
use crate::error::DecodeError;
use crate::wire;

const FIELD_PAYLOAD: u64 = 1;
const FIELD_CERTIFICATE_CHAIN: u64 = 2;
const FIELD_SIGNATURE: u64 = 3;

/// The three-field signed envelope.
///
/// Immutable once constructed. The record itself does not interpret its
/// fields; signing and verification live with the crypto layer.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedPayload {
    payload: Vec<u8>,
    certificate_chain: Vec<u8>,
    signature: Vec<u8>,
}

impl SignedPayload {
    pub fn new(
        payload: impl Into<Vec<u8>>,
        certificate_chain: impl Into<Vec<u8>>,
        signature: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            payload: payload.into(),
            certificate_chain: certificate_chain.into(),
            signature: signature.into(),
        }
    }

    /// The bytes protected by the signature.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// DER encoding of the certificate(s) establishing the public key.
    pub fn certificate_chain(&self) -> &[u8] {
        &self.certificate_chain
    }

    /// Raw signature over the payload field.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Serializes the record. Deterministic: equal records produce
    /// identical bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if !self.payload.is_empty() {
            wire::put_blob(FIELD_PAYLOAD, &self.payload, &mut out);
        }
        if !self.certificate_chain.is_empty() {
            wire::put_blob(FIELD_CERTIFICATE_CHAIN, &self.certificate_chain, &mut out);
        }
        if !self.signature.is_empty() {
            wire::put_blob(FIELD_SIGNATURE, &self.signature, &mut out);
        }
        out
    }

    /// Parses a serialized record, consuming the entire input.
    ///
    /// Rejects anything the envelope schema does not define; see the
    /// module documentation for the full list.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = wire::Reader::new(bytes);
        let mut payload: Option<Vec<u8>> = None;
        let mut certificate_chain: Option<Vec<u8>> = None;
        let mut signature: Option<Vec<u8>> = None;

        while !reader.is_empty() {
            let offset = reader.pos();
            let (field, wire_type) = reader.tag()?;
            if wire_type != wire::WIRE_TYPE_LEN {
                return Err(DecodeError::WrongWireType { field, wire_type, offset });
            }
            let blob = reader.blob()?;
            let slot = match field {
                FIELD_PAYLOAD => &mut payload,
                FIELD_CERTIFICATE_CHAIN => &mut certificate_chain,
                FIELD_SIGNATURE => &mut signature,
                _ => return Err(DecodeError::UnknownField { field, offset }),
            };
            if slot.is_some() {
                return Err(DecodeError::DuplicateField { field, offset });
            }
            *slot = Some(blob.to_vec());
        }

        Ok(Self {
            payload: payload.unwrap_or_default(),
            certificate_chain: certificate_chain.unwrap_or_default(),
            signature: signature.unwrap_or_default(),
        })
    }
}

impl fmt::Debug for SignedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedPayload")
            .field("payload", &format_args!("{} bytes", self.payload.len()))
            .field(
                "certificate_chain",
                &format_args!("{} bytes", self.certificate_chain.len()),
            )
            .field("signature", &format_args!("{} bytes", self.signature.len()))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn field_bytes() -> impl Strategy<Value = Vec<u8>> {
        proptest::collection::vec(any::<u8>(), 0..512)
    }

    proptest! {
        #[test]
        fn encode_decode_round_trips(
            payload in field_bytes(),
            chain in field_bytes(),
            signature in field_bytes(),
        ) {
            let envelope = SignedPayload::new(payload, chain, signature);
            let decoded = SignedPayload::decode(&envelope.encode()).unwrap();
            prop_assert_eq!(decoded, envelope);
        }

        #[test]
        fn encoding_is_deterministic(
            payload in field_bytes(),
            chain in field_bytes(),
            signature in field_bytes(),
        ) {
            let a = SignedPayload::new(payload.clone(), chain.clone(), signature.clone());
            let b = SignedPayload::new(payload, chain, signature);
            prop_assert_eq!(a.encode(), b.encode());
        }

        #[test]
        fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let _ = SignedPayload::decode(&bytes);
        }
    }
}
