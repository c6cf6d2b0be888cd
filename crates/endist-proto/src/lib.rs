//! # endist-proto — Signed Envelope Wire Format
//!
//! Serialization of the signed distribution envelope. Deployed client
//! applications parse this format with generated protocol-buffer code,
//! so the byte layout here is frozen: field numbers, varint framing, and
//! empty-field omission all match the published schema and are pinned by
//! known-byte-vector tests.
//!
//! The crate exposes one record, [`SignedPayload`], with a deterministic
//! [`SignedPayload::encode`] and a strict [`SignedPayload::decode`]. The
//! wire primitives underneath are private; nothing else in the workspace
//! touches raw varints.
//!
//! ## Crate Policy
//!
//! - No `unsafe`, no panics: decoding malformed input returns
//!   [`DecodeError`], encoding cannot fail.
//! - No dependency on the crypto layer: this crate moves bytes and knows
//!   nothing about keys or certificates.

pub mod error;
pub mod signed_payload;
mod wire;

pub use error::DecodeError;
pub use signed_payload::SignedPayload;
