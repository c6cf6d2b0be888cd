//! # Certificate Chains
//!
//! The DER bytes embedded verbatim in every signed envelope, validated
//! once at construction. [`CertificateChain`] parses the leaf (first)
//! certificate eagerly, requires its subject public key to be Ed25519,
//! and keeps the verifying key around so signing and verification never
//! re-parse DER on the hot path.
//!
//! Chain semantics are deliberately shallow here: the chain may hold one
//! certificate or a leaf-first concatenation, and only the leaf is ever
//! interpreted. Establishing trust in the chain is the relying party's
//! concern, not this layer's.

use std::fmt;
use ed25519_dalek::VerifyingKey;
use x509_parser::oid_registry::OID_SIG_ED25519;
use x509_parser::parse_x509_certificate;
use crate::error::CryptoError;

/// DER-encoded certificate chain with a parsed Ed25519 leaf key.
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateChain {
    der: Vec<u8>,
    leaf_key: VerifyingKey,
}

impl CertificateChain {
    /// Validates and wraps a DER chain. The input must start with an
    /// X.509 certificate whose subject public key is Ed25519; any bytes
    /// after the leaf certificate are carried along untouched.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
        let der = der.into();
        if der.is_empty() {
            return Err(CryptoError::EmptyCertificateChain);
        }
        let leaf_key = leaf_verifying_key(&der)?;
        Ok(Self { der, leaf_key })
    }

    /// The exact bytes embedded in envelopes.
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// Public key of the leaf certificate.
    pub fn leaf_verifying_key(&self) -> &VerifyingKey {
        &self.leaf_key
    }
}

impl fmt::Debug for CertificateChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateChain")
            .field("der", &format_args!("{} bytes", self.der.len()))
            .field("leaf_key", &self.leaf_key)
            .finish()
    }
}

/// Extracts the Ed25519 verifying key from the first certificate of a
/// DER chain.
fn leaf_verifying_key(der: &[u8]) -> Result<VerifyingKey, CryptoError> {
    let (_rest, certificate) =
        parse_x509_certificate(der).map_err(|_| CryptoError::CertificateParse)?;
    let spki = certificate.public_key();
    let algorithm = &spki.algorithm.algorithm;
    if *algorithm != OID_SIG_ED25519 {
        return Err(CryptoError::UnsupportedKeyAlgorithm { oid: algorithm.to_id_string() });
    }
    let key_bytes: [u8; 32] = spki
        .subject_public_key
        .data
        .as_ref()
        .try_into()
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    VerifyingKey::from_bytes(&key_bytes).map_err(|_| CryptoError::InvalidPublicKey)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
