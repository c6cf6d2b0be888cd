//! # The Signing Decorator
//!
//! Wraps a file node so that its write persists a signed envelope
//! instead of the raw content. The decoratee's bytes are produced in
//! memory, signed with the run's [`CryptoProvider`], packed into a
//! [`SignedPayload`] together with the provider's certificate chain, and
//! only the serialized envelope ever reaches disk. Everything structural
//! (name, parent, resolved path) stays exactly as it was; a signed
//! `export.bin` is still `export.bin` to its directory.

use std::sync::Arc;
use endist_proto::SignedPayload;
use endist_structure::{DynError, FileDecorator};
use tracing::trace;
use crate::provider::CryptoProvider;

/// File decorator producing signed envelopes.
///
/// Cheap to clone per node; any number of decorators may share one
/// provider.
#[derive(Clone, Debug)]
pub struct SigningDecorator {
    provider: Arc<CryptoProvider>,
}

impl SigningDecorator {
    pub fn new(provider: Arc<CryptoProvider>) -> Self {
        Self { provider }
    }

    /// Builds the envelope for a payload: the payload itself, the
    /// provider's certificate chain verbatim, and the Ed25519 signature
    /// computed over exactly the payload bytes.
    pub fn envelope(&self, payload: &[u8]) -> SignedPayload {
        let signature = self.provider.sign(payload);
        SignedPayload::new(
            payload,
            self.provider.certificate_chain().as_der(),
            signature.to_bytes(),
        )
    }
}

impl FileDecorator for SigningDecorator {
    fn decorate(&self, payload: Vec<u8>) -> Result<Vec<u8>, DynError> {
        let envelope = self.envelope(&payload);
        let encoded = envelope.encode();
        trace!(payload = payload.len(), envelope = encoded.len(), "signed file content");
        Ok(encoded)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
