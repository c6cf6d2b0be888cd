//! # endist-signing — Artifact Signing & Verification
//!
//! The signing layer of the distribution pipeline. A run's
//! [`CryptoProvider`] holds the private key and certificate chain;
//! [`SigningDecorator`] wraps file nodes so their write persists a
//! signed [`SignedPayload`] envelope instead of raw bytes; [`verify`]
//! implements the client-side check that the envelope proves what it
//! claims.
//!
//! ## Security Notes
//!
//! - The signature covers exactly the payload bytes, nothing else: not
//!   the certificate chain, not the envelope framing.
//! - The certificate chain is embedded verbatim; what a client
//!   downloads is byte-for-byte what the provider was constructed with.
//! - A provider cannot be built from a key and certificate that do not
//!   match, and unsigned intermediate bytes never reach disk.
//! - Verification uses `verify_strict`, and key material never appears
//!   in `Debug` output or logs.
//!
//! [`SignedPayload`]: endist_proto::SignedPayload

pub mod certificate;
pub mod decorator;
pub mod error;
pub mod provider;
pub mod verify;

pub use certificate::CertificateChain;
pub use decorator::SigningDecorator;
pub use error::CryptoError;
pub use provider::CryptoProvider;
pub use verify::{verify_artifact, verify_signed_payload};
