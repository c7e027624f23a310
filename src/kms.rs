//! Boundary for the remote key-management service.
//!
//! The crate never talks to a network itself; it consumes an implementation
//! of [`KmsClient`] and treats every call as a single synchronous
//! request/response exchange. The three operations mirror the service API:
//! key metadata lookup, public key fetch, and signing a precomputed digest.

use thiserror::Error;

use crate::error::{KmsSignError, Result};
use crate::scheme::HashFunction;

/// Opaque transport-level failure reported by a [`KmsClient`] implementation.
#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct KmsError(pub String);

impl KmsError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Signing algorithm reported by the remote service for a key version.
///
/// The tag is fixed when the key is created and discovered at adapter open
/// time; it is never negotiated. Anything outside the supported table is
/// carried as [`KeyAlgorithm::Other`] so errors can name it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAlgorithm {
    RsaSignPkcs1_2048Sha256,
    RsaSignPkcs1_3072Sha256,
    RsaSignPkcs1_4096Sha256,
    RsaSignPkcs1_4096Sha512,
    EcSignP256Sha256,
    EcSignP384Sha384,
    /// An algorithm tag this crate does not support.
    Other(String),
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            KeyAlgorithm::RsaSignPkcs1_2048Sha256 => "RSA_SIGN_PKCS1_2048_SHA256",
            KeyAlgorithm::RsaSignPkcs1_3072Sha256 => "RSA_SIGN_PKCS1_3072_SHA256",
            KeyAlgorithm::RsaSignPkcs1_4096Sha256 => "RSA_SIGN_PKCS1_4096_SHA256",
            KeyAlgorithm::RsaSignPkcs1_4096Sha512 => "RSA_SIGN_PKCS1_4096_SHA512",
            KeyAlgorithm::EcSignP256Sha256 => "EC_SIGN_P256_SHA256",
            KeyAlgorithm::EcSignP384Sha384 => "EC_SIGN_P384_SHA384",
            KeyAlgorithm::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// Digest envelope accepted by the remote signing call.
///
/// The variant must match the hash the key's algorithm was created with;
/// the service rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Digest {
    Sha256(Vec<u8>),
    Sha384(Vec<u8>),
    Sha512(Vec<u8>),
}

impl Digest {
    /// Wraps precomputed digest bytes in the envelope variant for `hash`.
    ///
    /// Fails if the digest length does not match the hash function's
    /// output length.
    pub fn new(hash: HashFunction, digest: &[u8]) -> Result<Self> {
        if digest.len() != hash.digest_len() {
            return Err(KmsSignError::UnsupportedHash {
                hash,
                digest_len: digest.len(),
            });
        }

        Ok(match hash {
            HashFunction::Sha256 => Digest::Sha256(digest.to_vec()),
            HashFunction::Sha384 => Digest::Sha384(digest.to_vec()),
            HashFunction::Sha512 => Digest::Sha512(digest.to_vec()),
        })
    }

    /// The digest bytes inside the envelope.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Digest::Sha256(bytes) | Digest::Sha384(bytes) | Digest::Sha512(bytes) => bytes,
        }
    }
}

/// Synchronous client for the remote key-management service.
///
/// Implementations own transport, authentication, and (if any) retry
/// policy; this crate performs exactly one call per operation and treats
/// any [`KmsError`] as terminal.
pub trait KmsClient {
    /// Looks up the signing algorithm of the key version `key_name`.
    fn resolve_algorithm(&self, key_name: &str) -> std::result::Result<KeyAlgorithm, KmsError>;

    /// Fetches the public half of `key_name` as a PEM-encoded SPKI block.
    fn fetch_public_key(&self, key_name: &str) -> std::result::Result<String, KmsError>;

    /// Signs a precomputed digest with `key_name`, returning the raw
    /// signature bytes (PKCS#1 v1.5 for RSA keys, ASN.1 DER for EC keys).
    fn asymmetric_sign(
        &self,
        key_name: &str,
        digest: Digest,
    ) -> std::result::Result<Vec<u8>, KmsError>;
}
