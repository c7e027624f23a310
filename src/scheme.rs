//! Maps a remote key's algorithm tag to the signature scheme and hash used
//! for all downstream encoding.
//!
//! This table is the single source of truth for the pairing; no other
//! module is allowed to infer a hash from a signature algorithm (or vice
//! versa) on its own.

use sha2::{Digest as _, Sha256, Sha384, Sha512};

use crate::cert::SignatureAlgorithm;
use crate::error::{KmsSignError, Result};
use crate::kms::KeyAlgorithm;

/// Hash function fixed by a key's algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFunction {
    Sha256,
    Sha384,
    Sha512,
}

impl HashFunction {
    /// Digest output length in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            HashFunction::Sha256 => 32,
            HashFunction::Sha384 => 48,
            HashFunction::Sha512 => 64,
        }
    }

    /// Hashes `data`, returning the digest bytes.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashFunction::Sha256 => Sha256::digest(data).to_vec(),
            HashFunction::Sha384 => Sha384::digest(data).to_vec(),
            HashFunction::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl std::fmt::Display for HashFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashFunction::Sha256 => f.write_str("SHA-256"),
            HashFunction::Sha384 => f.write_str("SHA-384"),
            HashFunction::Sha512 => f.write_str("SHA-512"),
        }
    }
}

/// The (signature algorithm, hash function) pair resolved for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScheme {
    pub signature: SignatureAlgorithm,
    pub hash: HashFunction,
}

impl ResolvedScheme {
    /// Resolves a reported key algorithm into its fixed scheme.
    ///
    /// Every supported algorithm maps to exactly one pair; unsupported
    /// values produce [`KmsSignError::UnsupportedAlgorithm`], never a
    /// default.
    pub fn for_key_algorithm(algorithm: &KeyAlgorithm) -> Result<Self> {
        match algorithm {
            KeyAlgorithm::RsaSignPkcs1_2048Sha256
            | KeyAlgorithm::RsaSignPkcs1_3072Sha256
            | KeyAlgorithm::RsaSignPkcs1_4096Sha256 => Ok(Self {
                signature: SignatureAlgorithm::Sha256WithRsa,
                hash: HashFunction::Sha256,
            }),
            KeyAlgorithm::RsaSignPkcs1_4096Sha512 => Ok(Self {
                signature: SignatureAlgorithm::Sha512WithRsa,
                hash: HashFunction::Sha512,
            }),
            KeyAlgorithm::EcSignP256Sha256 => Ok(Self {
                signature: SignatureAlgorithm::EcdsaWithSha256,
                hash: HashFunction::Sha256,
            }),
            KeyAlgorithm::EcSignP384Sha384 => Ok(Self {
                signature: SignatureAlgorithm::EcdsaWithSha384,
                hash: HashFunction::Sha384,
            }),
            KeyAlgorithm::Other(name) => {
                Err(KmsSignError::UnsupportedAlgorithm(name.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_algorithm_resolves() {
        let table = [
            (
                KeyAlgorithm::RsaSignPkcs1_2048Sha256,
                SignatureAlgorithm::Sha256WithRsa,
                HashFunction::Sha256,
            ),
            (
                KeyAlgorithm::RsaSignPkcs1_3072Sha256,
                SignatureAlgorithm::Sha256WithRsa,
                HashFunction::Sha256,
            ),
            (
                KeyAlgorithm::RsaSignPkcs1_4096Sha256,
                SignatureAlgorithm::Sha256WithRsa,
                HashFunction::Sha256,
            ),
            (
                KeyAlgorithm::RsaSignPkcs1_4096Sha512,
                SignatureAlgorithm::Sha512WithRsa,
                HashFunction::Sha512,
            ),
            (
                KeyAlgorithm::EcSignP256Sha256,
                SignatureAlgorithm::EcdsaWithSha256,
                HashFunction::Sha256,
            ),
            (
                KeyAlgorithm::EcSignP384Sha384,
                SignatureAlgorithm::EcdsaWithSha384,
                HashFunction::Sha384,
            ),
        ];

        for (algorithm, signature, hash) in table {
            let scheme = ResolvedScheme::for_key_algorithm(&algorithm).unwrap();
            assert_eq!(scheme.signature, signature);
            assert_eq!(scheme.hash, hash);
        }
    }

    #[test]
    fn unknown_algorithm_is_an_error_naming_the_tag() {
        let err = ResolvedScheme::for_key_algorithm(&KeyAlgorithm::Other(
            "EC_SIGN_SECP256K1_SHA256".to_string(),
        ))
        .unwrap_err();

        match err {
            KmsSignError::UnsupportedAlgorithm(name) => {
                assert_eq!(name, "EC_SIGN_SECP256K1_SHA256");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn digest_lengths() {
        assert_eq!(HashFunction::Sha256.digest(b"abc").len(), 32);
        assert_eq!(HashFunction::Sha384.digest(b"abc").len(), 48);
        assert_eq!(HashFunction::Sha512.digest(b"abc").len(), 64);
    }
}
