//! # Envelope Verification
//!
//! The consumer side of the contract: everything a client does with a
//! downloaded artifact before trusting it. Verification uses only what
//! the envelope itself carries, the payload and the embedded certificate
//! chain; no out-of-band key distribution is assumed at this layer.
//!
//! The producer never verifies its own output during a run. These
//! functions exist for clients, for operational spot checks, and as the
//! oracle the integration tests judge the pipeline by.

use ed25519_dalek::Signature;
use endist_proto::SignedPayload;
use crate::certificate::CertificateChain;
use crate::error::CryptoError;

/// Checks that an envelope's signature verifies over its payload with
/// the public key of its own embedded leaf certificate.
pub fn verify_signed_payload(envelope: &SignedPayload) -> Result<(), CryptoError> {
    let chain = CertificateChain::from_der(envelope.certificate_chain())?;
    let signature_bytes: [u8; 64] = envelope
        .signature()
        .try_into()
        .map_err(|_| CryptoError::InvalidSignatureLength(envelope.signature().len()))?;
    let signature = Signature::from_bytes(&signature_bytes);
    chain
        .leaf_verifying_key()
        .verify_strict(envelope.payload(), &signature)
        .map_err(|_| CryptoError::VerificationFailed)
}

/// Decodes raw artifact bytes and verifies them in one step, returning
/// the envelope on success.
pub fn verify_artifact(bytes: &[u8]) -> Result<SignedPayload, CryptoError> {
    let envelope = SignedPayload::decode(bytes)?;
    verify_signed_payload(&envelope)?;
    Ok(envelope)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------
