//! # The Signing Capability
//!
//! [`CryptoProvider`] pairs the private signing key of a distribution
//! run with the certificate chain that vouches for it. It is built once
//! by the orchestration layer (key loading and rotation live there),
//! validated so the key and leaf certificate provably belong together,
//! and then shared read-only with every signing decorator of the run.

use std::fmt;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use crate::certificate::CertificateChain;
use crate::error::CryptoError;

/// Immutable signing capability: one private key and its certificate
/// chain.
///
/// Construction fails unless the key matches the leaf certificate, so a
/// provider can never produce envelopes whose embedded chain belongs to
/// somebody else. Safe to share across threads behind an `Arc`.
pub struct CryptoProvider {
    signing_key: SigningKey,
    certificate_chain: CertificateChain,
}

impl CryptoProvider {
    pub fn new(
        signing_key: SigningKey,
        certificate_chain: CertificateChain,
    ) -> Result<Self, CryptoError> {
        if signing_key.verifying_key() != *certificate_chain.leaf_verifying_key() {
            return Err(CryptoError::KeyMismatch);
        }
        Ok(Self { signing_key, certificate_chain })
    }

    /// The chain embedded verbatim in every envelope this provider
    /// signs.
    pub fn certificate_chain(&self) -> &CertificateChain {
        &self.certificate_chain
    }

    /// Public half of the signing key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Signs exactly the given payload bytes. Ed25519 is deterministic:
    /// the same payload and key always produce the same signature.
    pub fn sign(&self, payload: &[u8]) -> Signature {
        self.signing_key.sign(payload)
    }
}

impl fmt::Debug for CryptoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoProvider")
            .field("signing_key", &"<private>")
            .field("certificate_chain", &self.certificate_chain)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
