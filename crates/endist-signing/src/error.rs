//! Error types for signing and envelope verification.

use endist_proto::DecodeError;

/// Error raised by certificate handling, provider construction, or
/// envelope verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// The certificate chain holds no bytes at all.
    #[error("certificate chain is empty")]
    EmptyCertificateChain,

    /// The leaf certificate is not parseable X.509 DER.
    #[error("certificate chain is not parseable X.509 DER")]
    CertificateParse,

    /// The leaf certificate's key was generated for a different
    /// signature algorithm.
    #[error("leaf certificate key algorithm {oid} is not Ed25519")]
    UnsupportedKeyAlgorithm { oid: String },

    /// The leaf certificate's subject public key is not a valid Ed25519
    /// point.
    #[error("leaf certificate public key is not a valid Ed25519 key")]
    InvalidPublicKey,

    /// The private signing key does not belong to the leaf certificate.
    #[error("signing key does not match the leaf certificate public key")]
    KeyMismatch,

    /// The envelope bytes did not decode.
    #[error("envelope does not decode: {0}")]
    Envelope(#[from] DecodeError),

    /// The signature field has the wrong length for Ed25519.
    #[error("signature is {0} bytes, expected 64")]
    InvalidSignatureLength(usize),

    /// The signature does not verify over the payload.
    #[error("signature verification failed")]
    VerificationFailed,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
