//! Adapts a remote signing key to the capability the certificate encoders
//! consume: report a public key, sign a precomputed digest.

use log::debug;

use crate::error::{KmsSignError, Result};
use crate::key::PublicKey;
use crate::kms::{Digest, KmsClient};
use crate::scheme::{HashFunction, ResolvedScheme};

/// Capability required to sign a certificate or request.
///
/// Exactly two operations: report the signing key's public half, and
/// produce a signature over a digest computed by the caller. The encoders
/// in [`crate::tbs_certificate`] and [`crate::request`] are the only
/// consumers.
pub trait CertificateSigner {
    /// The public half of the signing key. No I/O.
    fn public_key(&self) -> &PublicKey;

    /// Signs a precomputed digest, identified by its hash function.
    fn sign_digest(&self, digest: &[u8], hash: HashFunction) -> Result<Vec<u8>>;
}

/// A signing key held by the remote service.
///
/// Opening the adapter performs two round trips: one to learn the key's
/// algorithm, one to fetch its public key. Both must succeed; a partially
/// initialized adapter is never observable. After that, only
/// [`CertificateSigner::sign_digest`] touches the network.
pub struct RemoteSigner<C: KmsClient> {
    client: C,
    key_name: String,
    scheme: ResolvedScheme,
    public_key: PublicKey,
}

impl<C: KmsClient> RemoteSigner<C> {
    /// Opens an adapter for the key version `key_name`.
    pub fn open(client: C, key_name: impl Into<String>) -> Result<Self> {
        let key_name = key_name.into();

        let algorithm = client
            .resolve_algorithm(&key_name)
            .map_err(|e| KmsSignError::RetrievalFailed(format!(
                "could not get key version information: {e}"
            )))?;

        let scheme = ResolvedScheme::for_key_algorithm(&algorithm)?;

        let pem = client
            .fetch_public_key(&key_name)
            .map_err(|e| KmsSignError::RetrievalFailed(format!(
                "error fetching public key: {e}"
            )))?;

        let public_key = decode_public_key_response(&pem)?;

        debug!("opened remote signer for {key_name} ({algorithm})");

        Ok(Self {
            client,
            key_name,
            scheme,
            public_key,
        })
    }

    /// The key version resource name this adapter signs with.
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// The signature scheme fixed by the key's algorithm.
    pub fn scheme(&self) -> &ResolvedScheme {
        &self.scheme
    }
}

impl<C: KmsClient> CertificateSigner for RemoteSigner<C> {
    fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn sign_digest(&self, digest: &[u8], hash: HashFunction) -> Result<Vec<u8>> {
        // One hash per key; a different request is a caller bug, so reject
        // before touching the transport.
        if hash != self.scheme.hash {
            return Err(KmsSignError::HashMismatch {
                requested: hash,
                expected: self.scheme.hash,
            });
        }

        let envelope = Digest::new(hash, digest)?;

        debug!("signing {hash} digest with {}", self.key_name);

        self.client
            .asymmetric_sign(&self.key_name, envelope)
            .map_err(|e| KmsSignError::RemoteSigningFailed(e.to_string()))
    }
}

/// Decodes the PEM public key returned by the fetch call.
///
/// Failures here are [`KmsSignError::MalformedResponse`]: the service
/// answered, but with something that is not a usable public key.
fn decode_public_key_response(pem_str: &str) -> Result<PublicKey> {
    let block = pem::parse(pem_str).map_err(|e| {
        KmsSignError::MalformedResponse(format!("invalid PEM data in public key response: {e}"))
    })?;

    PublicKey::from_spki_der(block.contents())
        .map_err(|e| KmsSignError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kms::{KeyAlgorithm, KmsError};
    use pkcs8::EncodePublicKey;

    /// A client that refuses to sign; used to prove that certain failures
    /// never reach the transport.
    struct NoSignClient {
        algorithm: KeyAlgorithm,
        public_key_pem: String,
    }

    impl NoSignClient {
        fn p256() -> Self {
            let signing_key = p256::ecdsa::SigningKey::random(&mut rand_core::OsRng);
            let pem = signing_key
                .verifying_key()
                .to_public_key_pem(pkcs8::LineEnding::LF)
                .unwrap();
            Self {
                algorithm: KeyAlgorithm::EcSignP256Sha256,
                public_key_pem: pem,
            }
        }
    }

    impl KmsClient for NoSignClient {
        fn resolve_algorithm(&self, _key_name: &str) -> std::result::Result<KeyAlgorithm, KmsError> {
            Ok(self.algorithm.clone())
        }

        fn fetch_public_key(&self, _key_name: &str) -> std::result::Result<String, KmsError> {
            Ok(self.public_key_pem.clone())
        }

        fn asymmetric_sign(
            &self,
            _key_name: &str,
            _digest: Digest,
        ) -> std::result::Result<Vec<u8>, KmsError> {
            panic!("transport must not be invoked");
        }
    }

    #[test]
    fn hash_mismatch_is_rejected_before_the_remote_call() {
        let signer = RemoteSigner::open(NoSignClient::p256(), "test-key").unwrap();

        let err = signer.sign_digest(&[0u8; 48], HashFunction::Sha384).unwrap_err();

        assert!(matches!(
            err,
            KmsSignError::HashMismatch {
                requested: HashFunction::Sha384,
                expected: HashFunction::Sha256,
            }
        ));
    }

    #[test]
    fn open_fails_on_unsupported_algorithm() {
        let client = NoSignClient {
            algorithm: KeyAlgorithm::Other("HMAC_SHA256".to_string()),
            public_key_pem: String::new(),
        };

        let err = RemoteSigner::open(client, "test-key").err().unwrap();
        assert!(matches!(err, KmsSignError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn open_fails_on_non_pem_public_key() {
        let client = NoSignClient {
            algorithm: KeyAlgorithm::EcSignP256Sha256,
            public_key_pem: "definitely not pem".to_string(),
        };

        let err = RemoteSigner::open(client, "test-key").err().unwrap();
        assert!(matches!(err, KmsSignError::MalformedResponse(_)));
    }

    #[test]
    fn open_fails_on_transport_error() {
        struct FailingClient;

        impl KmsClient for FailingClient {
            fn resolve_algorithm(
                &self,
                _key_name: &str,
            ) -> std::result::Result<KeyAlgorithm, KmsError> {
                Err(KmsError::new("permission denied"))
            }

            fn fetch_public_key(&self, _key_name: &str) -> std::result::Result<String, KmsError> {
                unreachable!()
            }

            fn asymmetric_sign(
                &self,
                _key_name: &str,
                _digest: Digest,
            ) -> std::result::Result<Vec<u8>, KmsError> {
                unreachable!()
            }
        }

        let err = RemoteSigner::open(FailingClient, "test-key").err().unwrap();
        assert!(matches!(err, KmsSignError::RetrievalFailed(_)));
    }
}
